use crate::rf_pulse::Rf;
use crate::grad_pulse::{Trap, ArbitraryGrad, GradChannel};
use crate::adc_event::Adc;
use crate::delay_event::Delay;
use crate::label::Label;

/// either gradient representation, as stored in a block slot
#[derive(Clone,Debug)]
pub enum Gradient {
    Trap(Trap),
    Arbitrary(ArbitraryGrad),
}

impl Gradient {
    pub fn channel(&self) -> GradChannel {
        match self {
            Gradient::Trap(g) => g.channel,
            Gradient::Arbitrary(g) => g.channel,
        }
    }
    pub fn duration(&self) -> f32 {
        match self {
            Gradient::Trap(g) => g.duration(),
            Gradient::Arbitrary(g) => g.duration(),
        }
    }
    /// piecewise-linear breakpoints (time relative to block start, amplitude)
    pub fn trace(&self) -> (Vec<f32>,Vec<f32>) {
        match self {
            Gradient::Trap(g) => g.corners(),
            Gradient::Arbitrary(g) => {
                let t = g.tt().iter().map(|ti| ti + g.delay).collect();
                (t,g.waveform.clone())
            }
        }
    }
    /// amplitude at a time relative to the block start, zero outside the event
    pub fn amplitude_at(&self,t:f32) -> f32 {
        let (tt,aa) = self.trace();
        if tt.is_empty() || t < tt[0] || t > tt[tt.len()-1] {
            return 0.0;
        }
        utils::interp1(&tt,&aa,&vec![t])[0]
    }
}

/// events submitted to Sequence::add_block
#[derive(Clone,Debug)]
pub enum BlockEvent {
    Rf(Rf),
    Grad(Trap),
    ArbGrad(ArbitraryGrad),
    Adc(Adc),
    Delay(Delay),
    Label(Label),
}

impl BlockEvent {
    pub fn duration(&self) -> f32 {
        match self {
            BlockEvent::Rf(rf) => rf.duration(),
            BlockEvent::Grad(g) => g.duration(),
            BlockEvent::ArbGrad(g) => g.duration(),
            BlockEvent::Adc(adc) => adc.duration(),
            BlockEvent::Delay(d) => d.delay,
            BlockEvent::Label(_) => 0.0,
        }
    }
}

/// longest event duration determines the block length
pub fn calc_duration(events:&[BlockEvent]) -> f32 {
    events.iter().map(|e| e.duration()).fold(0.0,f32::max)
}

/// fully decompressed view of a stored block
#[derive(Clone,Debug,Default)]
pub struct Block {
    pub duration:f32,
    pub rf:Option<Rf>,
    pub gx:Option<Gradient>,
    pub gy:Option<Gradient>,
    pub gz:Option<Gradient>,
    pub adc:Option<Adc>,
    pub labels:Vec<Label>,
}

impl Block {
    pub fn gradient(&self,channel:GradChannel) -> Option<&Gradient> {
        match channel {
            GradChannel::X => self.gx.as_ref(),
            GradChannel::Y => self.gy.as_ref(),
            GradChannel::Z => self.gz.as_ref(),
        }
    }
    pub fn events(&self) -> Vec<BlockEvent> {
        let mut out = Vec::new();
        if let Some(rf) = &self.rf {out.push(BlockEvent::Rf(rf.clone()))}
        for g in [&self.gx,&self.gy,&self.gz].into_iter().flatten() {
            match g {
                Gradient::Trap(t) => out.push(BlockEvent::Grad(t.clone())),
                Gradient::Arbitrary(a) => out.push(BlockEvent::ArbGrad(a.clone())),
            }
        }
        if let Some(adc) = &self.adc {out.push(BlockEvent::Adc(adc.clone()))}
        for label in &self.labels {out.push(BlockEvent::Label(*label))}
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opts::Opts;
    use crate::grad_pulse::{TrapParams, make_trapezoid};
    use crate::delay_event::make_delay;

    #[test]
    fn longest_event_wins(){
        let system = Opts::default();
        let mut params = TrapParams::new(GradChannel::X);
        params.flat_time = Some(1.0E-3);
        params.amplitude = Some(1.0E5);
        let g = make_trapezoid(&params,&system);
        let d = make_delay(10.0E-3);
        let events = vec![BlockEvent::Grad(g.clone()),BlockEvent::Delay(d)];
        assert_eq!(calc_duration(&events),10.0E-3);
        let events = vec![BlockEvent::Grad(g.clone())];
        assert!((calc_duration(&events) - g.duration()).abs() < 1.0E-9);
    }

    #[test]
    fn trap_amplitude_interpolates(){
        let system = Opts::default();
        let mut params = TrapParams::new(GradChannel::X);
        params.flat_time = Some(1.0E-3);
        params.amplitude = Some(2.0E5);
        params.rise_time = Some(100.0E-6);
        let g = Gradient::Trap(make_trapezoid(&params,&system));
        assert_eq!(g.amplitude_at(50.0E-6),1.0E5);
        assert_eq!(g.amplitude_at(500.0E-6),2.0E5);
        assert_eq!(g.amplitude_at(5.0E-3),0.0);
    }
}
