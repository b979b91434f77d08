use serde::Serialize;
use crate::sequence::Sequence;
use crate::grad_pulse::GradChannel;

/*
 Typed plot data for external viewers. No rendering happens here, callers get
 time/amplitude traces on the absolute sequence timeline and draw them with
 whatever frontend they like.
 */

#[derive(Debug,Clone,Serialize)]
pub struct PlotTrace {
    pub x:Vec<f32>,
    pub y:Vec<f32>,
}

impl PlotTrace {
    pub fn new(x:Vec<f32>,y:Vec<f32>) -> Self {
        if x.len() != y.len() {
            panic!("vectors must be the same length");
        }
        Self {
            x,
            y,
        }
    }
}

#[derive(Debug,Clone,Serialize)]
pub struct SequencePlot {
    /// rf magnitude in Hz
    pub rf_mag:PlotTrace,
    /// rf phase in rad
    pub rf_phase:PlotTrace,
    /// one gradient trace per channel in Hz/m
    pub grad:[PlotTrace;3],
    /// adc sample instants, unit amplitude
    pub adc:PlotTrace,
    /// block boundary times
    pub block_edges:Vec<f32>,
}

impl Sequence {
    pub fn plot_data(&self) -> SequencePlot {
        let mut rf_mag = PlotTrace::new(Vec::new(),Vec::new());
        let mut rf_phase = PlotTrace::new(Vec::new(),Vec::new());
        let mut grad = [
            PlotTrace::new(Vec::new(),Vec::new()),
            PlotTrace::new(Vec::new(),Vec::new()),
            PlotTrace::new(Vec::new(),Vec::new()),
        ];
        let mut adc = PlotTrace::new(Vec::new(),Vec::new());
        let mut block_edges = vec![0.0];

        let mut t0 = 0.0;
        for index in 0..self.blocks.len() {
            let block = self.get_block(index);

            if let Some(rf) = &block.rf {
                for (ti,v) in rf.t.iter().zip(rf.signal.iter()) {
                    rf_mag.x.push(t0 + rf.delay + ti);
                    rf_mag.y.push(v.norm());
                    rf_phase.x.push(t0 + rf.delay + ti);
                    rf_phase.y.push(v.arg() + rf.phase_offset);
                }
            }

            for (ci,channel) in [GradChannel::X,GradChannel::Y,GradChannel::Z].iter().enumerate() {
                if let Some(g) = block.gradient(*channel) {
                    let (tt,aa) = g.trace();
                    for (ti,a) in tt.iter().zip(aa.iter()) {
                        grad[ci].x.push(t0 + ti);
                        grad[ci].y.push(*a);
                    }
                }
            }

            if let Some(a) = &block.adc {
                // sample_times are already relative to the block start
                for ts in a.sample_times() {
                    adc.x.push(t0 + ts);
                    adc.y.push(1.0);
                }
            }

            t0 += block.duration;
            block_edges.push(t0);
        }

        SequencePlot {
            rf_mag,
            rf_phase,
            grad,
            adc,
            block_edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opts::Opts;
    use crate::block::BlockEvent;
    use crate::delay_event::make_delay;
    use crate::grad_pulse::{TrapParams, make_trapezoid};
    use crate::rf_pulse::{SincPulseParams, make_sinc_pulse};

    #[test]
    fn traces_sit_on_the_absolute_timeline(){
        let system = Opts::default();
        let mut seq = crate::sequence::Sequence::new(&system);
        seq.add_block(&[BlockEvent::Delay(make_delay(2.0E-3))]);
        let rf = make_sinc_pulse(&SincPulseParams::new(std::f32::consts::FRAC_PI_2,1.0E-3),&system);
        seq.add_block(&[BlockEvent::Rf(rf)]);
        let mut params = TrapParams::new(GradChannel::Y);
        params.flat_time = Some(1.0E-3);
        params.amplitude = Some(1.0E5);
        seq.add_block(&[BlockEvent::Grad(make_trapezoid(&params,&system))]);

        let plot = seq.plot_data();
        assert_eq!(plot.block_edges.len(),4);
        // rf lives in the second block, after the 2 ms delay
        assert!(plot.rf_mag.x[0] > 2.0E-3);
        let g_start = plot.grad[1].x[0];
        assert!(g_start >= plot.block_edges[2]);
        assert!(plot.grad[0].x.is_empty());
        assert_eq!(plot.rf_mag.x.len(),plot.rf_phase.x.len());
    }

    #[test]
    fn adc_trace_starts_half_a_dwell_in(){
        let system = Opts::default();
        let mut seq = crate::sequence::Sequence::new(&system);
        let mut gp = TrapParams::new(GradChannel::X);
        gp.flat_time = Some(1.0E-3);
        gp.flat_area = Some(200.0);
        let gx = make_trapezoid(&gp,&system);
        let mut ap = crate::adc_event::AdcParams::new(50);
        ap.duration = Some(1.0E-3);
        ap.delay = gx.rise_time;
        let adc = crate::adc_event::make_adc(&ap,&system);
        let expected_first = adc.delay + 0.5*adc.dwell;
        seq.add_block(&[BlockEvent::Grad(gx),BlockEvent::Adc(adc)]);
        let plot = seq.plot_data();
        assert_eq!(plot.adc.x.len(),50);
        assert!((plot.adc.x[0] - expected_first).abs() < 1.0E-9,
            "first adc sample at {} s, expected {} s",plot.adc.x[0],expected_first);
    }
}
