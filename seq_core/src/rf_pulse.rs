/*
 RF pulse events. The envelope is a complex waveform in Hz sampled at the
 centers of RF raster intervals. Pulses are scaled so the integral of the
 envelope equals flip_angle/2pi, which makes the flip angle independent of the
 waveform shape.
 */

use std::f32::consts::PI;
use num_complex::Complex;
use serde::{Serialize, Deserialize};
use crate::opts::Opts;
use crate::grad_pulse::{GradChannel, Trap, TrapParams, make_trapezoid};

#[derive(Clone,Copy,PartialEq,Eq,Debug,Serialize,Deserialize)]
pub enum RfUse {
    Excitation,
    Refocusing,
    Inversion,
    Saturation,
    Preparation,
    Undefined,
}

impl RfUse {
    pub fn tag(&self) -> char {
        match self {
            RfUse::Excitation => 'e',
            RfUse::Refocusing => 'r',
            RfUse::Inversion => 'i',
            RfUse::Saturation => 's',
            RfUse::Preparation => 'p',
            RfUse::Undefined => 'u',
        }
    }
}

#[derive(Clone,Debug)]
pub struct Rf {
    pub signal:Vec<Complex<f32>>,
    pub t:Vec<f32>,
    pub shape_dur:f32,
    pub delay:f32,
    pub freq_offset:f32,
    pub phase_offset:f32,
    pub dead_time:f32,
    pub ringdown_time:f32,
    pub usage:RfUse,
}

impl Rf {
    pub fn duration(&self) -> f32 {
        self.delay + self.shape_dur + self.ringdown_time
    }
    pub fn peak_amplitude(&self) -> f32 {
        self.signal.iter().fold(0.0f32,|m,v| m.max(v.norm()))
    }
    /// time of the effective pulse center within the shape, and its sample index.
    /// this is the peak of the envelope; ties resolve to the midpoint of the
    /// flat maximum, which lands on the center of symmetric pulses
    pub fn center(&self) -> (f32,usize) {
        let peak = self.peak_amplitude();
        let eps = peak*1.0E-5;
        let first = self.signal.iter().position(|v| v.norm() >= peak - eps)
            .expect("rf pulse has no samples");
        let last = self.signal.iter().rposition(|v| v.norm() >= peak - eps).unwrap();
        let ic = (first + last)/2;
        (self.t[ic],ic)
    }
    /// full width at half max of the magnitude spectrum
    pub fn bandwidth(&self) -> f32 {
        let raster = if self.t.len() > 1 {self.t[1] - self.t[0]} else {self.shape_dur};
        utils::bandwidth(&self.signal,raster)
    }
}

pub struct SincPulseParams {
    pub flip_angle:f32,
    pub duration:f32,
    pub delay:f32,
    pub freq_offset:f32,
    pub phase_offset:f32,
    pub apodization:f32,
    pub time_bw_product:f32,
    pub slice_thickness:f32,
    pub center_pos:f32,
    pub usage:RfUse,
    pub max_grad:Option<f32>,
    pub max_slew:Option<f32>,
}

impl SincPulseParams {
    pub fn new(flip_angle:f32,duration:f32) -> SincPulseParams {
        assert!(duration > 0.0,"rf duration must be positive");
        SincPulseParams {
            flip_angle,
            duration,
            delay: 0.0,
            freq_offset: 0.0,
            phase_offset: 0.0,
            apodization: 0.0,
            time_bw_product: 4.0,
            slice_thickness: 0.0,
            center_pos: 0.5,
            usage: RfUse::Excitation,
            max_grad: None,
            max_slew: None,
        }
    }
}

fn sinc(x:f32) -> f32 {
    if x == 0.0 {1.0} else {(PI*x).sin()/(PI*x)}
}

pub fn make_sinc_pulse(params:&SincPulseParams,system:&Opts) -> Rf {
    let bw = params.time_bw_product/params.duration;
    let alpha = params.apodization;
    let n = (params.duration/system.rf_raster_time).round() as usize;
    assert!(n > 0,"rf duration shorter than the rf raster");

    let t:Vec<f32> = (1..=n).map(|i| (i as f32 - 0.5)*system.rf_raster_time).collect();
    let envelope:Vec<f32> = t.iter().map(|&ti| {
        let tt = ti - params.duration*params.center_pos;
        let window = (1.0 - alpha) + alpha*(2.0*PI*tt/params.duration).cos();
        window*sinc(bw*tt)
    }).collect();

    // scale so the envelope integral gives the requested flip angle
    let net:f32 = envelope.iter().sum::<f32>()*system.rf_raster_time;
    let scale = params.flip_angle/(2.0*PI)/net;
    let signal = envelope.iter().map(|&v| Complex::new(v*scale,0.0)).collect();

    let mut delay = params.delay;
    if system.rf_dead_time > delay {
        delay = system.rf_dead_time;
    }

    Rf {
        signal,
        t,
        shape_dur: n as f32*system.rf_raster_time,
        delay,
        freq_offset: params.freq_offset,
        phase_offset: params.phase_offset,
        dead_time: system.rf_dead_time,
        ringdown_time: system.rf_ringdown_time,
        usage: params.usage,
    }
}

/// sinc pulse together with its slice-select gradient and the rephasing lobe.
/// the rf delay and gradient delay are adjusted against each other so the
/// pulse plays out entirely on the gradient plateau
pub fn make_sinc_pulse_with_gz(params:&SincPulseParams,system:&Opts) -> (Rf,Trap,Trap) {
    assert!(params.slice_thickness > 0.0,"slice thickness must be provided");
    let mut rf = make_sinc_pulse(params,system);

    let bw = params.time_bw_product/params.duration;
    let amplitude = bw/params.slice_thickness;
    let area = amplitude*params.duration;

    let mut gz_params = TrapParams::new(GradChannel::Z);
    gz_params.flat_time = Some(params.duration);
    gz_params.flat_area = Some(area);
    gz_params.max_grad = params.max_grad;
    gz_params.max_slew = params.max_slew;
    let mut gz = make_trapezoid(&gz_params,system);

    let mut gzr_params = TrapParams::new(GradChannel::Z);
    gzr_params.area = Some(-area*(1.0 - params.center_pos) - 0.5*(gz.area() - area));
    gzr_params.max_grad = params.max_grad;
    gzr_params.max_slew = params.max_slew;
    let gzr = make_trapezoid(&gzr_params,system);

    if rf.delay > gz.rise_time {
        gz.delay = system.ceil_to_grad_raster(rf.delay - gz.rise_time);
    }
    if rf.delay < gz.rise_time + gz.delay {
        rf.delay = gz.rise_time + gz.delay;
    }

    (rf,gz,gzr)
}

/// rf pulse with an arbitrary envelope, supplied in relative units and scaled
/// to the flip angle like the analytic shapes
pub fn make_arbitrary_rf(envelope:&[Complex<f32>],flip_angle:f32,delay:f32,
                         freq_offset:f32,phase_offset:f32,usage:RfUse,system:&Opts) -> Rf {
    assert!(!envelope.is_empty(),"rf envelope must not be empty");
    let net:f32 = envelope.iter().map(|v| v.norm()).sum::<f32>()*system.rf_raster_time;
    let scale = flip_angle/(2.0*PI)/net;
    let signal:Vec<Complex<f32>> = envelope.iter().map(|v| *v*scale).collect();
    let n = signal.len();
    let t = (1..=n).map(|i| (i as f32 - 0.5)*system.rf_raster_time).collect();

    let mut delay = delay;
    if system.rf_dead_time > delay {
        delay = system.rf_dead_time;
    }

    Rf {
        signal,
        t,
        shape_dur: n as f32*system.rf_raster_time,
        delay,
        freq_offset,
        phase_offset,
        dead_time: system.rf_dead_time,
        ringdown_time: system.rf_ringdown_time,
        usage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_angle_scaling(){
        let system = Opts::default();
        let params = SincPulseParams {
            apodization: 0.5,
            ..SincPulseParams::new(PI/2.0,1.0E-3)
        };
        let rf = make_sinc_pulse(&params,&system);
        let net:f32 = rf.signal.iter().map(|v| v.re).sum::<f32>()*system.rf_raster_time;
        let flip = 2.0*PI*net;
        assert!((flip - PI/2.0).abs() < 1.0E-3,"flip angle came out as {}",flip);
    }

    #[test]
    fn center_of_symmetric_pulse(){
        let system = Opts::default();
        let rf = make_sinc_pulse(&SincPulseParams::new(PI/6.0,2.0E-3),&system);
        let (tc,_) = rf.center();
        assert!((tc - 1.0E-3).abs() < 2.0*system.rf_raster_time,"center was {}",tc);
    }

    #[test]
    fn slice_select_covers_pulse(){
        let mut system = Opts::default();
        system.rf_dead_time = 100.0E-6;
        system.rf_ringdown_time = 20.0E-6;
        let params = SincPulseParams {
            slice_thickness: 3.0E-3,
            apodization: 0.5,
            ..SincPulseParams::new(PI/12.0,3.0E-3)
        };
        let (rf,gz,gzr) = make_sinc_pulse_with_gz(&params,&system);
        // pulse must start on the plateau and fit inside it
        assert!(rf.delay + 1.0E-9 >= gz.delay + gz.rise_time);
        assert!(rf.delay + rf.shape_dur <= gz.delay + gz.rise_time + gz.flat_time + 1.0E-9);
        // rephaser undoes half the slice lobe
        let half = gz.area()/2.0;
        assert!((gzr.area() + half).abs() < half*1.0E-2,"gzr area {} vs {}",gzr.area(),-half);
        // slice gradient amplitude realizes bw/thickness
        let bw = params.time_bw_product/params.duration;
        assert!((gz.amplitude - bw/params.slice_thickness).abs() < 1.0);
    }

    #[test]
    #[cfg(feature = "sim")]
    fn bandwidth_matches_time_bw_product(){
        let system = Opts::default();
        let params = SincPulseParams::new(PI/2.0,1.0E-3);
        let rf = make_sinc_pulse(&params,&system);
        let bw = rf.bandwidth();
        let expected = params.time_bw_product/params.duration;
        assert!((bw - expected).abs() < 0.25*expected,"bandwidth {} vs {}",bw,expected);
    }

    #[test]
    fn dead_time_pushes_delay(){
        let mut system = Opts::default();
        system.rf_dead_time = 100.0E-6;
        let rf = make_sinc_pulse(&SincPulseParams::new(PI/2.0,1.0E-3),&system);
        assert_eq!(rf.delay,100.0E-6);
    }
}
