use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use serde::{Serialize, Deserialize};
use serde::de::DeserializeOwned;
use seq_core::{Sequence, SeqError};

#[derive(Debug)]
pub enum SequenceLoadError {
    InvalidFormat,
}

/// parameter structs are created with library defaults, then round-tripped
/// through json files that users edit
pub trait Initialize:Serialize + DeserializeOwned + Sized {
    fn default() -> Self;
    fn load(params_file:&Path) -> Result<Self,SequenceLoadError> {
        let mut f = File::open(params_file).expect("cannot open file");
        let mut json_str = String::new();
        f.read_to_string(&mut json_str).expect("trouble reading file");
        match serde_json::from_str(&json_str) {
            Ok(params) => Ok(params),
            Err(_) => Err(SequenceLoadError::InvalidFormat)
        }
    }
    fn write_default(params_file:&Path) {
        let params = Self::default();
        let str = serde_json::to_string_pretty(&params).expect("cannot serialize struct");
        let mut f = File::create(params_file).expect("cannot create file");
        f.write_all(str.as_bytes()).expect("trouble writing to file");
    }
}

pub trait PulseSequence {
    fn build(&self) -> Sequence;
    fn name(&self) -> String;
    /// timing-checked export to <dir>/<name>.seq
    fn seq_file_export(&self,dir:&Path) -> Result<(),SeqError> {
        let mut seq = self.build();
        let (ok,report) = seq.check_timing();
        if !ok {
            return Err(SeqError::Timing(report));
        }
        let filename = dir.join(self.name()).with_extension("seq");
        seq.write(&filename)
    }
}
