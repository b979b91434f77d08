use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use encoding::all::ISO_8859_1;
use encoding::{DecoderTrap, Encoding};
use regex::Regex;
use crate::error::SeqError;
use crate::opts::Opts;
use crate::sequence::{Sequence, BlockEntry, Definition, EXT_LABEL_SET, EXT_LABEL_INC};
use crate::label::LabelKind;
use crate::VERSION_MAJOR;

#[derive(Clone,Copy,PartialEq)]
enum Section {
    None,
    Version,
    Definitions,
    Blocks,
    Rf,
    Gradients,
    Trap,
    Adc,
    Extensions,
    ExtensionRows(u8),
    Shapes,
}

fn parse_f32(token:&str,line:&str) -> Result<f32,SeqError> {
    token.parse::<f32>()
        .map_err(|_| SeqError::Parse(format!("bad number '{}' in line '{}'",token,line)))
}

fn parse_usize(token:&str,line:&str) -> Result<usize,SeqError> {
    token.parse::<usize>()
        .map_err(|_| SeqError::Parse(format!("bad integer '{}' in line '{}'",token,line)))
}

fn numbers(line:&str) -> Result<Vec<f32>,SeqError> {
    line.split_whitespace().map(|t| parse_f32(t,line)).collect()
}

impl Sequence {
    pub fn read(path:&Path,system:&Opts) -> Result<Sequence,SeqError> {
        let mut f = File::open(path)?;
        let mut bytes = Vec::<u8>::new();
        f.read_to_end(&mut bytes)?;
        let s = ISO_8859_1.decode(&bytes,DecoderTrap::Strict)
            .map_err(|e| SeqError::Parse(format!("cannot decode sequence bytes: {}",e)))?;
        Sequence::from_file_string(&s,system)
    }

    pub fn from_file_string(s:&str,system:&Opts) -> Result<Sequence,SeqError> {
        let section_reg = Regex::new(r"^\[([A-Z]+)\]$").expect("invalid regex");
        let ext_decl_reg = Regex::new(r"^extension\s+([A-Z]+)\s+(\d+)$").expect("invalid regex");

        let mut seq = Sequence::new(system);
        seq.definitions.clear();

        let mut section = Section::None;
        let mut version = (0u32,0u32,0u32);
        let mut block_rows = Vec::<Vec<usize>>::new();
        // raw extension rows keep the file's type ids until the declarations are known
        let mut ext_rows = Vec::<(usize,u8,usize,usize)>::new();
        let mut ext_types = HashMap::<u8,u8>::new();
        let mut shape_id = 0usize;
        let mut shape_row = Vec::<f32>::new();

        let flush_shape = |seq:&mut Sequence,id:usize,row:Vec<f32>| {
            if id != 0 {
                seq.shape_library.insert_with_id(id,row,0);
            }
        };

        for raw in s.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(caps) = section_reg.captures(line) {
                flush_shape(&mut seq,shape_id,std::mem::take(&mut shape_row));
                shape_id = 0;
                section = match &caps[1] {
                    "VERSION" => Section::Version,
                    "DEFINITIONS" => Section::Definitions,
                    "BLOCKS" => Section::Blocks,
                    "RF" => Section::Rf,
                    "GRADIENTS" => Section::Gradients,
                    "TRAP" => Section::Trap,
                    "ADC" => Section::Adc,
                    "EXTENSIONS" => Section::Extensions,
                    "SHAPES" => Section::Shapes,
                    "SIGNATURE" => Section::None,
                    other => return Err(SeqError::Parse(format!("unknown section [{}]",other))),
                };
                continue;
            }

            if let Some(caps) = ext_decl_reg.captures(line) {
                let type_id = parse_usize(&caps[2],line)? as u8;
                let kind = match &caps[1] {
                    "LABELSET" => EXT_LABEL_SET,
                    "LABELINC" => EXT_LABEL_INC,
                    other => return Err(SeqError::Parse(format!("unsupported extension {}",other))),
                };
                ext_types.insert(type_id,kind);
                section = Section::ExtensionRows(kind);
                continue;
            }

            match section {
                Section::None => {}
                Section::Version => {
                    let mut it = line.split_whitespace();
                    let key = it.next().unwrap_or("");
                    let val = it.next().unwrap_or("");
                    let v = parse_usize(val,line)? as u32;
                    match key {
                        "major" => version.0 = v,
                        "minor" => version.1 = v,
                        "revision" => version.2 = v,
                        other => return Err(SeqError::Parse(format!("unknown version field {}",other))),
                    }
                }
                Section::Definitions => {
                    let mut it = line.splitn(2,char::is_whitespace);
                    let key = it.next()
                        .ok_or_else(|| SeqError::Parse(format!("bad definition line '{}'",line)))?;
                    let rest = it.next().unwrap_or("").trim();
                    let def = match numbers(rest) {
                        Ok(vals) if vals.len() == 1 => Definition::Num(vals[0]),
                        Ok(vals) if !vals.is_empty() => Definition::Nums(vals),
                        _ => Definition::Text(rest.to_string()),
                    };
                    seq.definitions.insert(key.to_string(),def);
                }
                Section::Blocks => {
                    let row:Result<Vec<usize>,SeqError> = line.split_whitespace()
                        .map(|t| parse_usize(t,line))
                        .collect();
                    let row = row?;
                    if row.len() != 8 {
                        return Err(SeqError::Parse(format!("block row needs 8 fields: '{}'",line)));
                    }
                    block_rows.push(row);
                }
                Section::Rf => {
                    let vals = numbers(line)?;
                    if vals.len() != 8 {
                        return Err(SeqError::Parse(format!("rf row needs 8 fields: '{}'",line)));
                    }
                    let row = vec![vals[1],vals[2],vals[3],vals[4],vals[5]*1.0E-6,vals[6],vals[7]];
                    seq.rf_library.insert_with_id(vals[0] as usize,row,0);
                }
                Section::Gradients => {
                    let vals = numbers(line)?;
                    if vals.len() != 5 {
                        return Err(SeqError::Parse(format!("gradient row needs 5 fields: '{}'",line)));
                    }
                    let row = vec![vals[1],vals[2],vals[3],vals[4]*1.0E-6];
                    seq.grad_library.insert_with_id(vals[0] as usize,row,b'g');
                }
                Section::Trap => {
                    let vals = numbers(line)?;
                    if vals.len() != 6 {
                        return Err(SeqError::Parse(format!("trap row needs 6 fields: '{}'",line)));
                    }
                    let row = vec![vals[1],vals[2]*1.0E-6,vals[3]*1.0E-6,vals[4]*1.0E-6,vals[5]*1.0E-6];
                    seq.grad_library.insert_with_id(vals[0] as usize,row,b't');
                }
                Section::Adc => {
                    let vals = numbers(line)?;
                    if vals.len() != 6 {
                        return Err(SeqError::Parse(format!("adc row needs 6 fields: '{}'",line)));
                    }
                    let row = vec![vals[1],vals[2]*1.0E-9,vals[3]*1.0E-6,vals[4],vals[5]];
                    seq.adc_library.insert_with_id(vals[0] as usize,row,0);
                }
                Section::Extensions => {
                    let vals = numbers(line)?;
                    if vals.len() != 4 {
                        return Err(SeqError::Parse(format!("extension row needs 4 fields: '{}'",line)));
                    }
                    ext_rows.push((vals[0] as usize,vals[1] as u8,vals[2] as usize,vals[3] as usize));
                }
                Section::ExtensionRows(kind) => {
                    let mut it = line.split_whitespace();
                    let id = parse_usize(it.next().unwrap_or(""),line)?;
                    let value = parse_f32(it.next().unwrap_or(""),line)?;
                    let tag = it.next()
                        .ok_or_else(|| SeqError::Parse(format!("label row needs a tag: '{}'",line)))?;
                    let label = LabelKind::from_tag(tag)
                        .ok_or_else(|| SeqError::Parse(format!("unknown label {}",tag)))?;
                    let row = vec![value,label.index() as f32];
                    match kind {
                        EXT_LABEL_SET => seq.label_set_library.insert_with_id(id,row,0),
                        _ => seq.label_inc_library.insert_with_id(id,row,0),
                    }
                }
                Section::Shapes => {
                    let mut it = line.split_whitespace();
                    match it.next() {
                        Some("shape_id") => {
                            flush_shape(&mut seq,shape_id,std::mem::take(&mut shape_row));
                            shape_id = parse_usize(it.next().unwrap_or(""),line)?;
                        }
                        Some("num_samples") => {
                            let n = parse_usize(it.next().unwrap_or(""),line)?;
                            shape_row.push(n as f32);
                        }
                        Some(token) => shape_row.push(parse_f32(token,line)?),
                        None => {}
                    }
                }
            }
        }
        flush_shape(&mut seq,shape_id,shape_row);

        if version.0 != VERSION_MAJOR {
            return Err(SeqError::Parse(format!("unsupported file version {}.{}.{}",
                version.0,version.1,version.2)));
        }

        // the file declares its own extension type ids; remap to the internal ones
        for (id,file_type,ref_id,next) in ext_rows {
            let kind = *ext_types.get(&file_type)
                .ok_or_else(|| SeqError::Parse(format!("extension row uses undeclared type {}",file_type)))?;
            seq.extension_library.insert_with_id(id,vec![kind as f32,ref_id as f32,next as f32],0);
        }

        let block_raster = match seq.get_definition("BlockDurationRaster") {
            Some(Definition::Num(v)) => *v,
            _ => system.block_duration_raster,
        };
        for row in block_rows {
            seq.blocks.push(BlockEntry {
                duration: row[1] as f32*block_raster,
                rf: row[2],
                gx: row[3],
                gy: row[4],
                gz: row[5],
                adc: row[6],
                ext: row[7],
            });
        }

        Ok(seq)
    }
}
