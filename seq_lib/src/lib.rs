pub mod pulse_sequence;
pub mod gre_2d;
pub mod se_2d;
