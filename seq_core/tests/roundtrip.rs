use seq_core::*;
use seq_core::sequence::Definition;
use seq_core::block::Gradient;

fn demo_sequence(system:&Opts) -> Sequence {
    let mut seq = Sequence::new(system);

    let params = SincPulseParams {
        slice_thickness: 5.0E-3,
        apodization: 0.5,
        ..SincPulseParams::new(std::f32::consts::FRAC_PI_2,1.0E-3)
    };
    let (rf,gz,gzr) = make_sinc_pulse_with_gz(&params,system);

    let mut gxp = TrapParams::new(GradChannel::X);
    gxp.flat_time = Some(3.2E-3);
    gxp.flat_area = Some(800.0);
    let gx = make_trapezoid(&gxp,system);

    let mut adcp = AdcParams::new(256);
    adcp.duration = Some(3.2E-3);
    adcp.delay = gx.rise_time;
    let adc = make_adc(&adcp,system);

    seq.add_block(&[BlockEvent::Rf(rf),BlockEvent::Grad(gz)]);
    seq.add_block(&[BlockEvent::Grad(gzr)]);
    seq.add_block(&[
        BlockEvent::Grad(gx),
        BlockEvent::Adc(adc),
        BlockEvent::Label(make_label(LabelKind::Lin,LabelOp::Inc,1)),
    ]);
    seq.add_block(&[BlockEvent::Delay(make_delay(5.0E-3))]);

    seq.set_definition("Name",Definition::Text("demo".to_string()));
    seq.set_definition("FOV",Definition::Nums(vec![0.2,0.2,0.005]));
    seq
}

#[test]
fn written_file_reads_back_identically(){
    let mut system = Opts::default();
    system.rf_dead_time = 100.0E-6;
    system.rf_ringdown_time = 20.0E-6;
    system.adc_dead_time = 10.0E-6;

    let seq = demo_sequence(&system);
    let text = seq.to_file_string();
    let restored = Sequence::from_file_string(&text,&system).expect("read back failed");

    assert_eq!(restored.n_blocks(),seq.n_blocks());
    assert!((restored.duration() - seq.duration()).abs() < 1.0E-6);
    assert_eq!(restored.get_definition("Name"),Some(&Definition::Text("demo".to_string())));

    for index in 0..seq.n_blocks() {
        let a = seq.get_block(index);
        let b = restored.get_block(index);
        assert!((a.duration - b.duration).abs() < 1.0E-9,"block {} duration drift",index);

        match (&a.rf,&b.rf) {
            (None,None) => {}
            (Some(ra),Some(rb)) => {
                assert_eq!(ra.signal.len(),rb.signal.len());
                assert!((ra.delay - rb.delay).abs() < 1.0E-6);
                for (va,vb) in ra.signal.iter().zip(rb.signal.iter()) {
                    assert!((va - vb).norm() < ra.peak_amplitude()*1.0E-4);
                }
            }
            _ => panic!("rf presence drifted in block {}",index),
        }

        for channel in [GradChannel::X,GradChannel::Y,GradChannel::Z] {
            match (a.gradient(channel),b.gradient(channel)) {
                (None,None) => {}
                (Some(Gradient::Trap(ga)),Some(Gradient::Trap(gb))) => {
                    assert!((ga.amplitude - gb.amplitude).abs() < ga.amplitude.abs()*1.0E-5 + 1.0E-3);
                    assert!((ga.rise_time - gb.rise_time).abs() < 1.0E-6);
                    assert!((ga.flat_time - gb.flat_time).abs() < 1.0E-6);
                }
                _ => panic!("gradient drifted in block {} channel {}",index,channel.tag()),
            }
        }

        match (&a.adc,&b.adc) {
            (None,None) => {}
            (Some(aa),Some(ab)) => {
                assert_eq!(aa.num_samples,ab.num_samples);
                assert!((aa.dwell - ab.dwell).abs() < 1.0E-9);
                assert!((aa.delay - ab.delay).abs() < 1.0E-6);
            }
            _ => panic!("adc presence drifted in block {}",index),
        }

        assert_eq!(a.labels,b.labels,"labels drifted in block {}",index);
    }
}

#[test]
fn timing_check_and_kspace_agree_on_the_demo(){
    let mut system = Opts::default();
    system.rf_dead_time = 100.0E-6;
    system.rf_ringdown_time = 20.0E-6;
    system.adc_dead_time = 10.0E-6;

    let mut seq = demo_sequence(&system);
    let (ok,report) = seq.check_timing();
    assert!(ok,"timing report: {:?}",report);

    let traj = seq.calculate_kspace(0.0);
    assert_eq!(traj.t_adc.len(),256);
    // slice moment is rephased by the end of the third block
    let readout_start = seq.get_block(0).duration + seq.get_block(1).duration;
    let i = traj.t.iter().position(|t| *t > readout_start).expect("trajectory too short");
    let kz = traj.k_traj[2][i];
    let gz_amp = match seq.get_block(0).gradient(GradChannel::Z) {
        Some(Gradient::Trap(g)) => g.amplitude,
        _ => panic!("slice gradient missing"),
    };
    assert!(kz.abs() < 0.05*gz_amp.abs()*1.0E-3,"residual slice moment {}",kz);
}
