use serde::{Serialize, Deserialize};

#[derive(Clone,Copy,Debug,PartialEq,Serialize,Deserialize)]
pub struct Delay {
    pub delay:f32,
}

pub fn make_delay(delay:f32) -> Delay {
    assert!(delay.is_finite() && delay >= 0.0,"delay must be a non-negative finite time, got {}",delay);
    Delay {
        delay,
    }
}
