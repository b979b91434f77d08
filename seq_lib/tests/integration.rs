use std::env::temp_dir;
use std::fs;
use seq_lib::pulse_sequence::{Initialize, PulseSequence};
use seq_lib::gre_2d::Gre2DParams;
use seq_core::Sequence;

#[test]
fn gre_exports_and_reads_back(){
    let mut params = <Gre2DParams as Initialize>::default();
    params.samples = (64,4);
    params.name = "gre_2d_export_test".to_string();

    let dir = temp_dir();
    params.seq_file_export(&dir).expect("export failed");

    let seq_file = dir.join(&params.name).with_extension("seq");
    let system = params.system();
    let restored = Sequence::read(&seq_file,&system).expect("read back failed");

    let built = params.build();
    assert_eq!(restored.n_blocks(),built.n_blocks());
    assert!((restored.duration() - built.duration()).abs() < 1.0E-5);

    fs::remove_file(seq_file).expect("cannot remove test output");
}

#[test]
fn params_round_trip_through_json(){
    let dir = temp_dir();
    let params_file = dir.join("gre_2d_params_test.json");
    Gre2DParams::write_default(&params_file);
    let params = Gre2DParams::load(&params_file).expect("cannot load params");
    assert_eq!(params.samples,(128,128));
    fs::remove_file(params_file).expect("cannot remove test output");
}
