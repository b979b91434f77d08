use serde::{Serialize, Deserialize};
use seq_core::*;
use seq_core::opts::{GradUnit, SlewUnit};
use seq_core::rf_pulse::RfUse;
use seq_core::sequence::Definition;
use crate::pulse_sequence::{Initialize, PulseSequence};

/*
 2-D spin echo. A slice-selective 90 followed by a slice-selective 180 at
 TE/2. The 180 mirrors the accumulated moment, so the readout prephaser has
 the same sign as the readout lobe.
 */

#[derive(Clone,Serialize,Deserialize)]
pub struct Se2DParams {
    pub name:String,
    /// mm (read, phase)
    pub fov:(f32,f32),
    /// (read samples, phase lines)
    pub samples:(u16,u16),
    /// mm
    pub slice_thickness:f32,
    pub rf_duration:f32,
    pub rf_180_duration:f32,
    pub time_bw_product:f32,
    pub apodization:f32,
    pub readout_time:f32,
    pub phase_encode_time:f32,
    pub echo_time:f32,
    pub rep_time:f32,
    /// mT/m
    pub max_grad:f32,
    /// T/m/s
    pub max_slew:f32,
    pub rf_dead_time:f32,
    pub rf_ringdown_time:f32,
    pub adc_dead_time:f32,
}

impl Initialize for Se2DParams {
    fn default() -> Self {
        Se2DParams {
            name: "se_2d".to_string(),
            fov: (20.0, 20.0),
            samples: (128, 128),
            slice_thickness: 2.0,
            rf_duration: 2.0E-3,
            rf_180_duration: 2.0E-3,
            time_bw_product: 4.0,
            apodization: 0.5,
            readout_time: 6.4E-3,
            phase_encode_time: 2.5E-3,
            echo_time: 20.0E-3,
            rep_time: 50.0E-3,
            max_grad: 40.0,
            max_slew: 170.0,
            rf_dead_time: 100.0E-6,
            rf_ringdown_time: 20.0E-6,
            adc_dead_time: 10.0E-6,
        }
    }
}

impl Se2DParams {
    pub fn system(&self) -> Opts {
        let mut system = Opts::new(
            self.max_grad,GradUnit::MilliTeslaPerMeter,
            self.max_slew,SlewUnit::TeslaPerMeterPerSec,
        );
        system.rf_dead_time = self.rf_dead_time;
        system.rf_ringdown_time = self.rf_ringdown_time;
        system.adc_dead_time = self.adc_dead_time;
        system
    }
}

impl PulseSequence for Se2DParams {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn build(&self) -> Sequence {
        let system = self.system();
        let mut seq = Sequence::new(&system);

        let fov_read = self.fov.0*1.0E-3;
        let fov_phase = self.fov.1*1.0E-3;
        let (n_read,n_phase) = self.samples;

        let excite_params = SincPulseParams {
            slice_thickness: self.slice_thickness*1.0E-3,
            apodization: self.apodization,
            time_bw_product: self.time_bw_product,
            ..SincPulseParams::new(std::f32::consts::FRAC_PI_2,self.rf_duration)
        };
        let (rf90,gz90,gzr) = make_sinc_pulse_with_gz(&excite_params,&system);

        let refocus_params = SincPulseParams {
            slice_thickness: self.slice_thickness*1.0E-3,
            apodization: self.apodization,
            time_bw_product: self.time_bw_product,
            usage: RfUse::Refocusing,
            ..SincPulseParams::new(std::f32::consts::PI,self.rf_180_duration)
        };
        let (rf180,gz180,_) = make_sinc_pulse_with_gz(&refocus_params,&system);

        let delta_k = 1.0/fov_read;
        let mut gx_params = TrapParams::new(GradChannel::X);
        gx_params.flat_time = Some(self.readout_time);
        gx_params.flat_area = Some(n_read as f32*delta_k);
        let gx = make_trapezoid(&gx_params,&system);

        let mut adc_params = AdcParams::new(n_read as u32);
        adc_params.duration = Some(self.readout_time);
        adc_params.delay = gx.rise_time;
        let adc = make_adc(&adc_params,&system);

        // the 180 flips the moment, so the prephaser is positive
        let mut gx_pre_params = TrapParams::new(GradChannel::X);
        gx_pre_params.area = Some(gx.area()/2.0);
        let gx_pre = make_trapezoid(&gx_pre_params,&system);

        let pre_dur = system.ceil_to_block_raster(
            gx_pre.duration().max(gzr.duration()).max(self.phase_encode_time));

        let half_te = self.echo_time/2.0;
        let after_90 = gz90.flat_time/2.0 + gz90.fall_time;
        let to_180 = gz180.delay + gz180.rise_time + gz180.flat_time/2.0;
        let after_180 = gz180.flat_time/2.0 + gz180.fall_time;
        let to_echo = adc.delay + adc.sampling_time()/2.0;

        let delay_1 = system.ceil_to_block_raster(half_te - after_90 - pre_dur - to_180);
        assert!(delay_1 >= 0.0,"echo time {} s is too short for this protocol",self.echo_time);
        let delay_2 = system.ceil_to_block_raster(half_te - after_180 - to_echo);
        assert!(delay_2 >= 0.0,"echo time {} s is too short for this protocol",self.echo_time);

        let ssel_90 = system.ceil_to_block_raster(calc_duration(&[
            BlockEvent::Rf(rf90.clone()),BlockEvent::Grad(gz90.clone())]));
        let ssel_180 = system.ceil_to_block_raster(calc_duration(&[
            BlockEvent::Rf(rf180.clone()),BlockEvent::Grad(gz180.clone())]));
        let read_dur = system.ceil_to_block_raster(gx.duration().max(adc.duration()));
        let delay_tr = self.rep_time - ssel_90 - pre_dur - delay_1 - ssel_180 - delay_2 - read_dur;
        assert!(delay_tr >= 0.0,"rep time {} s is too short for this protocol",self.rep_time);

        let delta_k_phase = 1.0/fov_phase;
        for i in 0..n_phase {
            let mut gy_params = TrapParams::new(GradChannel::Y);
            gy_params.duration = Some(self.phase_encode_time);
            gy_params.area = Some((i as f32 - n_phase as f32/2.0)*delta_k_phase);
            let gy = make_trapezoid(&gy_params,&system);

            seq.add_block(&[BlockEvent::Rf(rf90.clone()),BlockEvent::Grad(gz90.clone())]);
            seq.add_block(&[
                BlockEvent::Grad(gx_pre.clone()),
                BlockEvent::Grad(gzr.clone()),
                BlockEvent::Grad(gy),
                BlockEvent::Delay(make_delay(pre_dur)),
            ]);
            if delay_1 > 0.0 {
                seq.add_block(&[BlockEvent::Delay(make_delay(delay_1))]);
            }
            seq.add_block(&[BlockEvent::Rf(rf180.clone()),BlockEvent::Grad(gz180.clone())]);
            if delay_2 > 0.0 {
                seq.add_block(&[BlockEvent::Delay(make_delay(delay_2))]);
            }
            seq.add_block(&[
                BlockEvent::Grad(gx.clone()),
                BlockEvent::Adc(adc.clone()),
                BlockEvent::Label(make_label(LabelKind::Lin,LabelOp::Set,i as i32)),
            ]);
            if delay_tr > 0.0 {
                seq.add_block(&[BlockEvent::Delay(make_delay(delay_tr))]);
            }
        }

        seq.set_definition("Name",Definition::Text(self.name.clone()));
        seq.set_definition("FOV",Definition::Nums(vec![
            fov_read,fov_phase,self.slice_thickness*1.0E-3]));
        seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Se2DParams {
        let mut params = <Se2DParams as Initialize>::default();
        params.samples = (64,8);
        params
    }

    #[test]
    fn timing_is_consistent(){
        let params = small();
        let mut seq = params.build();
        let (ok,report) = seq.check_timing();
        assert!(ok,"timing report: {:?}",report);
        assert_eq!(seq.n_blocks(),7*8);
        let tr = seq.duration()/8.0;
        assert!((tr - params.rep_time).abs() < 1.0E-5,"tr came out as {}",tr);
    }

    #[test]
    fn refocused_echo_is_centered(){
        let params = small();
        let seq = params.build();
        let traj = seq.calculate_kspace(0.0);
        let n_read = params.samples.0 as usize;
        let delta_k = 1.0E3/params.fov.0;
        // the mirror at the 180 turns the positive prephaser into -area/2,
        // so kx crosses zero mid-readout
        let mid = (traj.k_adc[0][n_read/2 - 1] + traj.k_adc[0][n_read/2])/2.0;
        assert!(mid.abs() < delta_k,"kx at echo center {}",mid);
        // first and last sample sit symmetrically around the center
        let first = traj.k_adc[0][0];
        let last = traj.k_adc[0][n_read - 1];
        assert!((first + last).abs() < 2.0*delta_k,"echo asymmetry {} {}",first,last);
    }
}
