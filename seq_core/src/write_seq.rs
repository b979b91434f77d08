use std::fs::File;
use std::io::Write;
use std::path::Path;
use encoding::all::ISO_8859_1;
use encoding::{EncoderTrap, Encoding};
use crate::error::SeqError;
use crate::sequence::{Sequence, EXT_LABEL_SET, EXT_LABEL_INC};
use crate::label::SUPPORTED_LABELS;
use crate::{VERSION_MAJOR, VERSION_MINOR, VERSION_REVISION};

/*
 Open file format, version 1.4.0. Times are stored as integers on their
 hardware raster (block durations in block-raster units, delays in us, adc
 dwell in ns) while amplitudes keep full float precision.
 */

fn fmt(v:f32) -> String {
    format!("{}",v)
}

fn us(t:f32) -> i64 {
    (t*1.0E6).round() as i64
}

impl Sequence {
    pub fn write(&self,path:&Path) -> Result<(),SeqError> {
        let s = self.to_file_string();
        let bytes = ISO_8859_1.encode(&s,EncoderTrap::Strict)
            .map_err(|e| SeqError::Parse(format!("cannot encode sequence text: {}",e)))?;
        let mut f = File::create(path)?;
        f.write_all(&bytes)?;
        Ok(())
    }

    pub fn to_file_string(&self) -> String {
        let mut out = String::new();
        out.push_str("# Pulseq sequence file\n");
        out.push_str("# Created by seq_core\n\n");

        out.push_str("[VERSION]\n");
        out.push_str(&format!("major {}\n",VERSION_MAJOR));
        out.push_str(&format!("minor {}\n",VERSION_MINOR));
        out.push_str(&format!("revision {}\n\n",VERSION_REVISION));

        if !self.definitions.is_empty() {
            out.push_str("[DEFINITIONS]\n");
            for (key,value) in &self.definitions {
                out.push_str(&format!("{} {}\n",key,value.to_file_string()));
            }
            out.push('\n');
        }

        out.push_str("# Format of blocks:\n");
        out.push_str("# NUM DUR RF  GX  GY  GZ  ADC  EXT\n");
        out.push_str("[BLOCKS]\n");
        for (i,b) in self.blocks.iter().enumerate() {
            let dur = (b.duration/self.system.block_duration_raster).round() as i64;
            out.push_str(&format!("{} {} {} {} {} {} {} {}\n",
                i + 1,dur,b.rf,b.gx,b.gy,b.gz,b.adc,b.ext));
        }
        out.push('\n');

        if !self.rf_library.is_empty() {
            out.push_str("# Format of RF events:\n");
            out.push_str("# id amplitude mag_id phase_id time_id delay freq phase\n");
            out.push_str("# ..        Hz   ....     ....    ....    us   Hz   rad\n");
            out.push_str("[RF]\n");
            for (id,row) in self.rf_library.rows() {
                out.push_str(&format!("{} {} {} {} {} {} {} {}\n",
                    id,fmt(row[0]),row[1] as i64,row[2] as i64,row[3] as i64,
                    us(row[4]),fmt(row[5]),fmt(row[6])));
            }
            out.push('\n');
        }

        let traps:Vec<(usize,&Vec<f32>)> = self.grad_library.rows()
            .filter(|(id,_)| self.grad_library.tag(*id) == b't')
            .collect();
        let arbs:Vec<(usize,&Vec<f32>)> = self.grad_library.rows()
            .filter(|(id,_)| self.grad_library.tag(*id) == b'g')
            .collect();

        if !arbs.is_empty() {
            out.push_str("# Format of arbitrary gradients:\n");
            out.push_str("# id amplitude amp_shape_id time_shape_id delay\n");
            out.push_str("# ..      Hz/m       ....          ....      us\n");
            out.push_str("[GRADIENTS]\n");
            for (id,row) in &arbs {
                out.push_str(&format!("{} {} {} {} {}\n",
                    id,fmt(row[0]),row[1] as i64,row[2] as i64,us(row[3])));
            }
            out.push('\n');
        }

        if !traps.is_empty() {
            out.push_str("# Format of trapezoid gradients:\n");
            out.push_str("# id amplitude rise flat fall delay\n");
            out.push_str("# ..      Hz/m   us   us   us    us\n");
            out.push_str("[TRAP]\n");
            for (id,row) in &traps {
                out.push_str(&format!("{} {} {} {} {} {}\n",
                    id,fmt(row[0]),us(row[1]),us(row[2]),us(row[3]),us(row[4])));
            }
            out.push('\n');
        }

        if !self.adc_library.is_empty() {
            out.push_str("# Format of ADC events:\n");
            out.push_str("# id num dwell delay freq phase\n");
            out.push_str("# ..  ..    ns    us   Hz   rad\n");
            out.push_str("[ADC]\n");
            for (id,row) in self.adc_library.rows() {
                let dwell_ns = (row[1]*1.0E9).round() as i64;
                out.push_str(&format!("{} {} {} {} {} {}\n",
                    id,row[0] as i64,dwell_ns,us(row[2]),fmt(row[3]),fmt(row[4])));
            }
            out.push('\n');
        }

        if !self.extension_library.is_empty() {
            out.push_str("# Format of extension lists:\n");
            out.push_str("# id type ref next_id\n");
            out.push_str("# next_id of 0 terminates the list\n");
            out.push_str("[EXTENSIONS]\n");
            for (id,row) in self.extension_library.rows() {
                out.push_str(&format!("{} {} {} {}\n",
                    id,row[0] as i64,row[1] as i64,row[2] as i64));
            }
            out.push('\n');
            if !self.label_set_library.is_empty() {
                out.push_str(&format!("extension LABELSET {}\n",EXT_LABEL_SET));
                for (id,row) in self.label_set_library.rows() {
                    out.push_str(&format!("{} {} {}\n",
                        id,row[0] as i64,SUPPORTED_LABELS[row[1] as usize].tag()));
                }
                out.push('\n');
            }
            if !self.label_inc_library.is_empty() {
                out.push_str(&format!("extension LABELINC {}\n",EXT_LABEL_INC));
                for (id,row) in self.label_inc_library.rows() {
                    out.push_str(&format!("{} {} {}\n",
                        id,row[0] as i64,SUPPORTED_LABELS[row[1] as usize].tag()));
                }
                out.push('\n');
            }
        }

        if !self.shape_library.is_empty() {
            out.push_str("# Sequence shapes\n");
            out.push_str("[SHAPES]\n\n");
            for (id,row) in self.shape_library.rows() {
                out.push_str(&format!("shape_id {}\n",id));
                out.push_str(&format!("num_samples {}\n",row[0] as i64));
                for v in &row[1..] {
                    out.push_str(&fmt(*v));
                    out.push('\n');
                }
                out.push('\n');
            }
        }

        out
    }
}
