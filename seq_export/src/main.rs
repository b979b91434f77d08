mod args;

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use clap::Parser;
use serde::{Serialize, Deserialize};
use seq_core::{Opts, Sequence};
use seq_core::opts::{GradUnit, SlewUnit};
use seq_lib::pulse_sequence::{Initialize, PulseSequence};
use seq_lib::gre_2d::Gre2DParams;
use seq_lib::se_2d::Se2DParams;
use crate::args::{Action, SeqExportArgs};

const SEQUENCE_ALIASES:[&str;2] = ["gre_2d","se_2d"];

/// scanner limits as they appear in the toml config, in vendor units
#[derive(Serialize,Deserialize)]
struct SystemConfig {
    /// mT/m
    max_grad:f32,
    /// T/m/s
    max_slew:f32,
    rf_dead_time:f32,
    rf_ringdown_time:f32,
    adc_dead_time:f32,
}

impl SystemConfig {
    fn default() -> Self {
        Self {
            max_grad: 40.0,
            max_slew: 170.0,
            rf_dead_time: 100.0E-6,
            rf_ringdown_time: 20.0E-6,
            adc_dead_time: 10.0E-6,
        }
    }
    fn to_opts(&self) -> Opts {
        let mut system = Opts::new(
            self.max_grad,GradUnit::MilliTeslaPerMeter,
            self.max_slew,SlewUnit::TeslaPerMeterPerSec,
        );
        system.rf_dead_time = self.rf_dead_time;
        system.rf_ringdown_time = self.rf_ringdown_time;
        system.adc_dead_time = self.adc_dead_time;
        system
    }
    fn load(config_file:&Path) -> Self {
        let mut f = File::open(config_file).expect("cannot open file");
        let mut str = String::new();
        f.read_to_string(&mut str).expect("trouble reading file");
        toml::from_str(&str).expect("cannot deserialize system config. Is it corrupt?")
    }
    fn write_default(config_file:&Path) {
        let str = toml::to_string_pretty(&Self::default()).expect("cannot serialize config");
        let mut f = File::create(config_file).expect("cannot create file");
        f.write_all(str.as_bytes()).expect("trouble writing to file");
    }
}

fn main() {
    let args = SeqExportArgs::parse();
    match args.action {
        Action::ListSequences => {
            for alias in SEQUENCE_ALIASES {
                println!("{}",alias);
            }
        }
        Action::NewParams(a) => {
            let dest = a.destination.join(&a.alias).with_extension("json");
            match a.alias.as_str() {
                "gre_2d" => Gre2DParams::write_default(&dest),
                "se_2d" => Se2DParams::write_default(&dest),
                other => panic!("unknown sequence {}. try list-sequences",other),
            }
            println!("wrote {}",dest.display());
        }
        Action::NewSystemConfig(a) => {
            let dest = a.destination.join("system").with_extension("toml");
            SystemConfig::write_default(&dest);
            println!("wrote {}",dest.display());
        }
        Action::Build(a) => {
            let result = match a.alias.as_str() {
                "gre_2d" => {
                    let params = Gre2DParams::load(&a.params_file)
                        .expect("cannot load parameter file");
                    params.seq_file_export(&a.destination)
                }
                "se_2d" => {
                    let params = Se2DParams::load(&a.params_file)
                        .expect("cannot load parameter file");
                    params.seq_file_export(&a.destination)
                }
                other => panic!("unknown sequence {}. try list-sequences",other),
            };
            match result {
                Ok(()) => println!("sequence written to {}",a.destination.display()),
                Err(e) => {
                    eprintln!("export failed: {}",e);
                    std::process::exit(1);
                }
            }
        }
        Action::Report(a) => {
            let system = match &a.system {
                Some(config_file) => SystemConfig::load(config_file).to_opts(),
                None => Opts::default(),
            };
            match Sequence::read(&a.seq_file,&system) {
                Ok(seq) => {
                    println!("{}",a.seq_file.display());
                    println!("blocks: {}",seq.n_blocks());
                    println!("duration: {} s",seq.duration());
                    for (key,value) in &seq.definitions {
                        println!("{}: {}",key,value.to_file_string());
                    }
                }
                Err(e) => {
                    eprintln!("cannot read sequence file: {}",e);
                    std::process::exit(1);
                }
            }
        }
    }
}
