pub mod opts;
pub mod shape;
pub mod label;
pub mod grad_pulse;
pub mod rf_pulse;
pub mod adc_event;
pub mod delay_event;
pub mod block;
pub mod event_library;
pub mod sequence;
pub mod write_seq;
pub mod read_seq;
pub mod kspace;
pub mod plot;
pub mod error;

pub use opts::{Opts, GradUnit, SlewUnit};
pub use grad_pulse::{GradChannel, Trap, TrapParams, make_trapezoid};
pub use rf_pulse::{Rf, RfUse, SincPulseParams, make_sinc_pulse, make_sinc_pulse_with_gz};
pub use adc_event::{Adc, AdcParams, make_adc};
pub use delay_event::{Delay, make_delay};
pub use label::{Label, LabelKind, LabelOp, make_label};
pub use block::{BlockEvent, calc_duration};
pub use sequence::Sequence;
pub use error::SeqError;

// version stamped into the [VERSION] section of exported files
pub const VERSION_MAJOR: u32 = 1;
pub const VERSION_MINOR: u32 = 4;
pub const VERSION_REVISION: u32 = 0;
