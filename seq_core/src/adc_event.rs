use serde::{Serialize, Deserialize};
use crate::opts::Opts;

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct Adc {
    pub num_samples:u32,
    pub dwell:f32,
    pub delay:f32,
    pub freq_offset:f32,
    pub phase_offset:f32,
    pub dead_time:f32,
}

impl Adc {
    pub fn sampling_time(&self) -> f32 {
        self.num_samples as f32*self.dwell
    }
    pub fn duration(&self) -> f32 {
        self.delay + self.sampling_time() + self.dead_time
    }
    /// sample instants relative to the block start. samples sit at the centers
    /// of the dwell intervals (the half-dwell shift convention)
    pub fn sample_times(&self) -> Vec<f32> {
        (0..self.num_samples).map(|i| self.delay + (i as f32 + 0.5)*self.dwell).collect()
    }
}

pub struct AdcParams {
    pub num_samples:u32,
    pub dwell:Option<f32>,
    pub duration:Option<f32>,
    pub delay:f32,
    pub freq_offset:f32,
    pub phase_offset:f32,
}

impl AdcParams {
    pub fn new(num_samples:u32) -> AdcParams {
        AdcParams {
            num_samples,
            dwell: None,
            duration: None,
            delay: 0.0,
            freq_offset: 0.0,
            phase_offset: 0.0,
        }
    }
}

pub fn make_adc(params:&AdcParams,system:&Opts) -> Adc {
    assert!(params.num_samples > 0,"adc must have at least one sample");
    let dwell = match (params.dwell,params.duration) {
        (Some(dwell),None) => dwell,
        (None,Some(duration)) => duration/params.num_samples as f32,
        _ => panic!("exactly one of dwell or duration must be supplied"),
    };
    assert!(dwell > 0.0,"dwell time must be positive");

    let mut delay = params.delay;
    if system.adc_dead_time > delay {
        delay = system.adc_dead_time;
    }

    Adc {
        num_samples: params.num_samples,
        dwell,
        delay,
        freq_offset: params.freq_offset,
        phase_offset: params.phase_offset,
        dead_time: system.adc_dead_time,
    }
}
