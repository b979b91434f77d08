/*
 Trapezoidal and arbitrary gradient events. Amplitudes are in Hz/m, times in
 seconds, and all ramp times land on the gradient raster. A trapezoid can be
 specified by any consistent combination of area, flat area, amplitude,
 duration and flat time; the solver picks the shortest ramps that honor the
 system slew and amplitude limits.
 */

use serde::{Serialize, Deserialize};
use crate::opts::Opts;

#[derive(Clone,Copy,PartialEq,Eq,Debug,Serialize,Deserialize)]
pub enum GradChannel {
    X,
    Y,
    Z,
}

impl GradChannel {
    pub fn index(&self) -> usize {
        match self {
            GradChannel::X => 0,
            GradChannel::Y => 1,
            GradChannel::Z => 2,
        }
    }
    pub fn from_index(index:usize) -> GradChannel {
        match index {
            0 => GradChannel::X,
            1 => GradChannel::Y,
            2 => GradChannel::Z,
            _ => panic!("gradient channel index out of range: {}",index),
        }
    }
    pub fn tag(&self) -> &'static str {
        match self {
            GradChannel::X => "x",
            GradChannel::Y => "y",
            GradChannel::Z => "z",
        }
    }
}

#[derive(Clone,Debug,PartialEq)]
pub struct Trap {
    pub channel:GradChannel,
    pub amplitude:f32,
    pub rise_time:f32,
    pub flat_time:f32,
    pub fall_time:f32,
    pub delay:f32,
}

impl Trap {
    pub fn area(&self) -> f32 {
        self.amplitude*(self.flat_time + self.rise_time/2.0 + self.fall_time/2.0)
    }
    pub fn flat_area(&self) -> f32 {
        self.amplitude*self.flat_time
    }
    pub fn duration(&self) -> f32 {
        self.delay + self.rise_time + self.flat_time + self.fall_time
    }
    /// corner times (relative to the block start) and amplitudes
    pub fn corners(&self) -> (Vec<f32>,Vec<f32>) {
        if self.flat_time > 0.0 {
            (vec![
                self.delay,
                self.delay + self.rise_time,
                self.delay + self.rise_time + self.flat_time,
                self.delay + self.rise_time + self.flat_time + self.fall_time,
            ],
            vec![0.0,self.amplitude,self.amplitude,0.0])
        } else {
            (vec![
                self.delay,
                self.delay + self.rise_time,
                self.delay + self.rise_time + self.fall_time,
            ],
            vec![0.0,self.amplitude,0.0])
        }
    }
}

/// arbitrary gradient waveform sampled on the gradient raster
#[derive(Clone,Debug,PartialEq)]
pub struct ArbitraryGrad {
    pub channel:GradChannel,
    pub waveform:Vec<f32>,
    pub delay:f32,
    pub raster:f32,
}

impl ArbitraryGrad {
    pub fn shape_dur(&self) -> f32 {
        self.waveform.len() as f32*self.raster
    }
    pub fn duration(&self) -> f32 {
        self.delay + self.shape_dur()
    }
    pub fn first(&self) -> f32 {
        *self.waveform.first().unwrap_or(&0.0)
    }
    pub fn last(&self) -> f32 {
        *self.waveform.last().unwrap_or(&0.0)
    }
    pub fn amplitude(&self) -> f32 {
        self.waveform.iter().fold(0.0f32,|m,v| m.max(v.abs()))
    }
    /// sample times at the centers of the raster intervals
    pub fn tt(&self) -> Vec<f32> {
        (0..self.waveform.len()).map(|i| (i as f32 + 0.5)*self.raster).collect()
    }
}

pub fn make_arbitrary_grad(channel:GradChannel,waveform:Vec<f32>,delay:f32,system:&Opts) -> ArbitraryGrad {
    assert!(!waveform.is_empty(),"gradient waveform must not be empty");
    let peak = waveform.iter().fold(0.0f32,|m,v| m.max(v.abs()));
    assert!(peak <= system.max_grad,"gradient amplitude exceeded: {} Hz/m > {} Hz/m",peak,system.max_grad);
    ArbitraryGrad {
        channel,
        waveform,
        delay,
        raster: system.grad_raster_time,
    }
}

/// specification of a trapezoid. unset options fall back to the solver
pub struct TrapParams {
    pub channel:GradChannel,
    pub amplitude:Option<f32>,
    pub area:Option<f32>,
    pub flat_area:Option<f32>,
    pub duration:Option<f32>,
    pub flat_time:Option<f32>,
    pub rise_time:Option<f32>,
    pub delay:f32,
    pub max_grad:Option<f32>,
    pub max_slew:Option<f32>,
}

impl TrapParams {
    pub fn new(channel:GradChannel) -> TrapParams {
        TrapParams {
            channel,
            amplitude: None,
            area: None,
            flat_area: None,
            duration: None,
            flat_time: None,
            rise_time: None,
            delay: 0.0,
            max_grad: None,
            max_slew: None,
        }
    }
}

pub fn make_trapezoid(params:&TrapParams,system:&Opts) -> Trap {
    let max_grad = params.max_grad.unwrap_or(system.max_grad);
    let max_slew = params.max_slew.unwrap_or(system.max_slew);
    assert!(max_grad > 0.0 && max_slew > 0.0,"system limits must be positive");
    if params.area.is_none() && params.flat_area.is_none() && params.amplitude.is_none() {
        panic!("must supply one of area, flat_area or amplitude");
    }

    let raster = system.grad_raster_time;
    let amplitude;
    let rise_time;
    let fall_time;
    let flat_time;

    if let Some(flat) = params.flat_time {
        // flat time fixed: amplitude comes from the flat area unless given
        let amp = match params.amplitude {
            Some(a) => a,
            None => match params.flat_area {
                Some(fa) => fa/flat,
                None => panic!("when flat_time is used, amplitude or flat_area must be supplied"),
            }
        };
        let rise = match params.rise_time {
            Some(r) => r,
            None => {
                let r = system.ceil_to_grad_raster(amp.abs()/max_slew);
                if r == 0.0 {raster} else {r}
            }
        };
        amplitude = amp;
        rise_time = rise;
        fall_time = rise;
        flat_time = flat;
    } else if let Some(total) = params.duration {
        // total duration fixed: solve for the amplitude through the slew limit
        let mut amp = match params.amplitude {
            Some(a) => a,
            None => {
                let area = params.area.expect("when duration is used, amplitude or area must be supplied");
                match params.rise_time {
                    Some(r) => area/(total - r),
                    None => {
                        let d_c = 1.0/(2.0*max_slew) + 1.0/(2.0*max_slew);
                        let possible = total*total - 4.0*area.abs()*d_c;
                        assert!(possible >= 0.0,
                            "requested area is too large for this gradient duration");
                        area.signum()*(total - possible.sqrt())/(2.0*d_c)
                    }
                }
            }
        };
        let rise = match params.rise_time {
            Some(r) => r,
            None => {
                let r = system.ceil_to_grad_raster(amp.abs()/max_slew);
                if r == 0.0 {raster} else {r}
            }
        };
        let flat = total - 2.0*rise;
        assert!(flat >= -1.0E-7,"requested duration {} s is too short for the ramps",total);
        let flat = flat.max(0.0);
        if params.amplitude.is_none() {
            // recompute so the ramp quantization does not perturb the area
            let area = params.area.unwrap();
            amp = area/(rise/2.0 + rise/2.0 + flat);
        }
        amplitude = amp;
        rise_time = rise;
        fall_time = rise;
        flat_time = flat;
    } else if let Some(area) = params.area {
        // free timing: find the shortest trapezoid realizing the area
        let mut rise = system.ceil_to_grad_raster((area.abs()/max_slew).sqrt());
        if rise < raster {rise = raster}
        let mut amp = area/rise;
        let mut t_eff = rise;
        if amp.abs() > max_grad {
            t_eff = system.ceil_to_grad_raster(area.abs()/max_grad);
            amp = area/t_eff;
            rise = system.ceil_to_grad_raster(amp.abs()/max_slew);
            if rise == 0.0 {rise = raster}
        }
        amplitude = amp;
        rise_time = rise;
        fall_time = rise;
        flat_time = t_eff - rise;
    } else {
        panic!("must supply flat_time, duration, or area");
    }

    assert!(amplitude.abs() <= max_grad + 1.0E-3,
        "gradient amplitude exceeded: {} Hz/m > {} Hz/m",amplitude.abs(),max_grad);
    assert!(amplitude.abs()/rise_time <= max_slew*(1.0 + 1.0E-4),
        "slew rate exceeded: {} Hz/m/s > {} Hz/m/s",amplitude.abs()/rise_time,max_slew);

    Trap {
        channel: params.channel,
        amplitude,
        rise_time,
        flat_time,
        fall_time,
        delay: params.delay,
    }
}
