use std::f32::consts::PI;
use serde::{Serialize, Deserialize};

// gyromagnetic ratio of hydrogen
pub const GAMMA_BAR:f32 = 42.576e6;
pub const GAMMA:f32 = 2.0*PI*GAMMA_BAR;

#[derive(Clone,Copy,PartialEq,Debug,Serialize,Deserialize)]
pub enum GradUnit {
    HzPerMeter,
    MilliTeslaPerMeter,
    RadPerMsPerMm,
}

#[derive(Clone,Copy,PartialEq,Debug,Serialize,Deserialize)]
pub enum SlewUnit {
    HzPerMeterPerSec,
    MilliTeslaPerMeterPerMs,
    TeslaPerMeterPerSec,
    RadPerMsPerMmPerMs,
}

pub fn grad_to_hz_per_meter(value:f32,unit:GradUnit) -> f32 {
    match unit {
        GradUnit::HzPerMeter => value,
        GradUnit::MilliTeslaPerMeter => value*1.0E-3*GAMMA_BAR,
        GradUnit::RadPerMsPerMm => value*1.0E6/(2.0*PI),
    }
}

pub fn slew_to_hz_per_meter_per_sec(value:f32,unit:SlewUnit) -> f32 {
    match unit {
        SlewUnit::HzPerMeterPerSec => value,
        SlewUnit::MilliTeslaPerMeterPerMs => value*GAMMA_BAR,
        SlewUnit::TeslaPerMeterPerSec => value*GAMMA_BAR,
        SlewUnit::RadPerMsPerMmPerMs => value*1.0E9/(2.0*PI),
    }
}

/// scanner system limits. gradient strengths are always stored in Hz/m and slew
/// rates in Hz/m/s so event construction never has to carry units around
#[derive(Clone,PartialEq,Debug,Serialize,Deserialize)]
pub struct Opts {
    pub max_grad:f32,
    pub max_slew:f32,
    pub rf_dead_time:f32,
    pub rf_ringdown_time:f32,
    pub adc_dead_time:f32,
    pub rf_raster_time:f32,
    pub grad_raster_time:f32,
    pub adc_raster_time:f32,
    pub block_duration_raster:f32,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            max_grad: grad_to_hz_per_meter(40.0,GradUnit::MilliTeslaPerMeter),
            max_slew: slew_to_hz_per_meter_per_sec(170.0,SlewUnit::TeslaPerMeterPerSec),
            rf_dead_time: 0.0,
            rf_ringdown_time: 0.0,
            adc_dead_time: 0.0,
            rf_raster_time: 1.0E-6,
            grad_raster_time: 10.0E-6,
            adc_raster_time: 100.0E-9,
            block_duration_raster: 10.0E-6,
        }
    }
}

impl Opts {
    pub fn new(max_grad:f32,grad_unit:GradUnit,max_slew:f32,slew_unit:SlewUnit) -> Opts {
        assert!(max_grad > 0.0,"max gradient strength must be positive");
        assert!(max_slew > 0.0,"max slew rate must be positive");
        Opts {
            max_grad: grad_to_hz_per_meter(max_grad,grad_unit),
            max_slew: slew_to_hz_per_meter_per_sec(max_slew,slew_unit),
            ..Opts::default()
        }
    }

    /// smallest gradient-raster multiple that is >= t
    pub fn ceil_to_grad_raster(&self,t:f32) -> f32 {
        (t/self.grad_raster_time - 1.0E-6).ceil()*self.grad_raster_time
    }

    pub fn ceil_to_block_raster(&self,t:f32) -> f32 {
        (t/self.block_duration_raster - 1.0E-6).ceil()*self.block_duration_raster
    }

    pub fn on_grad_raster(&self,t:f32) -> bool {
        let n = t/self.grad_raster_time;
        (n - n.round()).abs() < 1.0E-4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_conversion(){
        let system = Opts::new(28.0,GradUnit::MilliTeslaPerMeter,150.0,SlewUnit::TeslaPerMeterPerSec);
        assert!((system.max_grad - 28.0E-3*GAMMA_BAR).abs() < 1.0);
        assert!((system.max_slew - 150.0*GAMMA_BAR).abs() < 1.0);
    }

    #[test]
    fn raster_rounding(){
        let system = Opts::default();
        assert!((system.ceil_to_grad_raster(25.0E-6) - 30.0E-6).abs() < 1.0E-9);
        assert!((system.ceil_to_grad_raster(30.0E-6) - 30.0E-6).abs() < 1.0E-9);
        assert!(system.on_grad_raster(120.0E-6));
        assert!(!system.on_grad_raster(125.0E-6));
    }
}
