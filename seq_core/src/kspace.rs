use crate::sequence::Sequence;
use crate::rf_pulse::RfUse;
use crate::grad_pulse::GradChannel;

/*
 Gradient moment bookkeeping. The trajectory is integrated on the gradient
 raster with one sample per raster interval midpoint. Excitation pulses zero
 the accumulated moment at their center, refocusing pulses mirror it.
 */

pub struct KspaceTrajectory {
    /// raster midpoint times, whole sequence
    pub t:Vec<f32>,
    /// trajectory in 1/m on the raster grid, one trace per channel
    pub k_traj:[Vec<f32>;3],
    /// adc sample times
    pub t_adc:Vec<f32>,
    /// trajectory interpolated at the adc sample times
    pub k_adc:[Vec<f32>;3],
}

enum RfAction {
    Zero,
    Mirror,
}

impl Sequence {
    /// per-channel gradient amplitudes in Hz/m, sampled at the midpoint of
    /// every gradient raster interval across the whole timeline
    pub fn gradient_waveforms(&self) -> [Vec<f32>;3] {
        let raster = self.system.grad_raster_time;
        let mut waves = [Vec::new(),Vec::new(),Vec::new()];
        for index in 0..self.blocks.len() {
            let block = self.get_block(index);
            let n = (block.duration/raster).round() as usize;
            for (ci,channel) in [GradChannel::X,GradChannel::Y,GradChannel::Z].iter().enumerate() {
                match block.gradient(*channel) {
                    Some(g) => {
                        for i in 0..n {
                            let tm = (i as f32 + 0.5)*raster;
                            waves[ci].push(g.amplitude_at(tm));
                        }
                    }
                    None => waves[ci].extend(std::iter::repeat(0.0).take(n)),
                }
            }
        }
        waves
    }

    pub fn calculate_kspace(&self,trajectory_delay:f32) -> KspaceTrajectory {
        assert!(trajectory_delay.abs() <= 100.0E-6,
            "trajectory delay {} s is out of the supported range",trajectory_delay);

        let raster = self.system.grad_raster_time;
        let waves = self.gradient_waveforms();
        let total_samples = waves[0].len();
        let t:Vec<f32> = (0..total_samples).map(|i| (i as f32 + 0.5)*raster).collect();

        // rf centers and adc samples on the absolute timeline
        let mut rf_events = Vec::<(f32,RfAction)>::new();
        let mut t_adc = Vec::<f32>::new();
        let mut t0 = 0.0;
        for index in 0..self.blocks.len() {
            let block = self.get_block(index);
            if let Some(rf) = &block.rf {
                let center = t0 + rf.delay + rf.center().0;
                match rf.usage {
                    RfUse::Refocusing => rf_events.push((center,RfAction::Mirror)),
                    RfUse::Excitation | RfUse::Undefined => rf_events.push((center,RfAction::Zero)),
                    _ => {}
                }
            }
            if let Some(adc) = &block.adc {
                // sample_times are already relative to the block start
                for ts in adc.sample_times() {
                    t_adc.push(t0 + ts + trajectory_delay);
                }
            }
            t0 += block.duration;
        }

        let mut k_traj = [
            vec![0.0;total_samples],
            vec![0.0;total_samples],
            vec![0.0;total_samples],
        ];
        for ci in 0..3 {
            let mut k = 0.0;
            let mut next_rf = 0usize;
            for i in 0..total_samples {
                while next_rf < rf_events.len() && rf_events[next_rf].0 <= t[i] {
                    match rf_events[next_rf].1 {
                        RfAction::Zero => k = 0.0,
                        RfAction::Mirror => k = -k,
                    }
                    next_rf += 1;
                }
                k += waves[ci][i]*raster;
                k_traj[ci][i] = k;
            }
        }

        let k_adc = [
            utils::interp1(&t,&k_traj[0],&t_adc),
            utils::interp1(&t,&k_traj[1],&t_adc),
            utils::interp1(&t,&k_traj[2],&t_adc),
        ];

        KspaceTrajectory {
            t,
            k_traj,
            t_adc,
            k_adc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opts::Opts;
    use crate::block::BlockEvent;
    use crate::grad_pulse::{TrapParams, make_trapezoid};
    use crate::rf_pulse::{SincPulseParams, make_sinc_pulse_with_gz};
    use crate::adc_event::{AdcParams, make_adc};

    #[test]
    fn trapezoid_accumulates_its_area(){
        let system = Opts::default();
        let mut seq = crate::sequence::Sequence::new(&system);
        let mut params = TrapParams::new(GradChannel::X);
        params.area = Some(250.0);
        let g = make_trapezoid(&params,&system);
        let area = g.area();
        seq.add_block(&[BlockEvent::Grad(g)]);
        let traj = seq.calculate_kspace(0.0);
        let k_end = *traj.k_traj[0].last().expect("empty trajectory");
        assert!((k_end - area).abs() < area.abs()*1.0E-2,"k {} vs area {}",k_end,area);
        assert_eq!(traj.k_traj[1].last(),Some(&0.0));
    }

    #[test]
    fn excitation_zeroes_the_moment(){
        let system = Opts::default();
        let mut seq = crate::sequence::Sequence::new(&system);
        let mut pre = TrapParams::new(GradChannel::Z);
        pre.area = Some(500.0);
        seq.add_block(&[BlockEvent::Grad(make_trapezoid(&pre,&system))]);
        let params = SincPulseParams {
            slice_thickness: 5.0E-3,
            ..SincPulseParams::new(std::f32::consts::FRAC_PI_2,1.0E-3)
        };
        let (rf,gz,gzr) = make_sinc_pulse_with_gz(&params,&system);
        seq.add_block(&[BlockEvent::Rf(rf),BlockEvent::Grad(gz)]);
        let expected = gzr.area();
        seq.add_block(&[BlockEvent::Grad(gzr)]);
        let traj = seq.calculate_kspace(0.0);
        let k_end = *traj.k_traj[2].last().expect("empty trajectory");
        // moment before the pulse center is discarded, so only the second half
        // of the slice gradient and the rephaser remain
        assert!(k_end.abs() < 0.05*expected.abs(),"residual moment {}",k_end);
    }

    #[test]
    fn adc_samples_follow_the_readout(){
        let system = Opts::default();
        let mut seq = crate::sequence::Sequence::new(&system);
        let mut gp = TrapParams::new(GradChannel::X);
        gp.flat_time = Some(3.2E-3);
        gp.flat_area = Some(800.0);
        let gx = make_trapezoid(&gp,&system);
        let mut ap = AdcParams::new(64);
        ap.duration = Some(3.2E-3);
        ap.delay = gx.rise_time;
        let adc = make_adc(&ap,&system);
        seq.add_block(&[BlockEvent::Grad(gx),BlockEvent::Adc(adc)]);
        let traj = seq.calculate_kspace(0.0);
        assert_eq!(traj.t_adc.len(),64);
        assert_eq!(traj.k_adc[0].len(),64);
        // kx must increase monotonically across the flat top
        for pair in traj.k_adc[0].windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn adc_samples_keep_the_half_dwell_shift(){
        let system = Opts::default();
        let mut seq = crate::sequence::Sequence::new(&system);
        let mut gp = TrapParams::new(GradChannel::X);
        gp.flat_time = Some(3.2E-3);
        gp.flat_area = Some(800.0);
        let gx = make_trapezoid(&gp,&system);
        let mut ap = AdcParams::new(64);
        ap.duration = Some(3.2E-3);
        ap.delay = gx.rise_time;
        let adc = make_adc(&ap,&system);
        let expected_first = adc.delay + 0.5*adc.dwell;
        seq.add_block(&[BlockEvent::Grad(gx),BlockEvent::Adc(adc)]);
        let traj = seq.calculate_kspace(0.0);
        // first sample sits half a dwell into the acquisition window, not a
        // full adc delay later
        assert!((traj.t_adc[0] - expected_first).abs() < 1.0E-9,
            "first adc sample at {} s, expected {} s",traj.t_adc[0],expected_first);
        let last = traj.t_adc[63];
        assert!((last - (expected_first + 63.0*50.0E-6)).abs() < 1.0E-8);
    }

    #[test]
    #[should_panic(expected = "trajectory delay")]
    fn oversized_trajectory_delay_rejected(){
        let system = Opts::default();
        let seq = crate::sequence::Sequence::new(&system);
        seq.calculate_kspace(150.0E-6);
    }
}
