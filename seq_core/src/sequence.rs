use std::collections::BTreeMap;
use std::f32::consts::PI;
use num_complex::Complex;
use crate::opts::Opts;
use crate::block::{Block, BlockEvent, Gradient, calc_duration};
use crate::event_library::EventLibrary;
use crate::shape::{CompressedShape, compress_shape, decompress_shape};
use crate::rf_pulse::{Rf, RfUse};
use crate::grad_pulse::{Trap, ArbitraryGrad, GradChannel};
use crate::adc_event::Adc;
use crate::label::{Label, LabelKind, LabelOp, SUPPORTED_LABELS};

pub const EXT_LABEL_SET:u8 = 1;
pub const EXT_LABEL_INC:u8 = 2;

const EPS:f32 = 1.0E-9;

#[derive(Clone,Debug,PartialEq)]
pub enum Definition {
    Num(f32),
    Nums(Vec<f32>),
    Text(String),
}

impl Definition {
    pub fn to_file_string(&self) -> String {
        match self {
            Definition::Num(v) => format!("{}",v),
            Definition::Nums(vals) => {
                let strs:Vec<String> = vals.iter().map(|v| format!("{}",v)).collect();
                strs.join(" ")
            }
            Definition::Text(s) => s.clone(),
        }
    }
}

/// one row of the block table. zero means "no event in this slot"
#[derive(Clone,Copy,Debug,Default,PartialEq)]
pub struct BlockEntry {
    pub duration:f32,
    pub rf:usize,
    pub gx:usize,
    pub gy:usize,
    pub gz:usize,
    pub adc:usize,
    pub ext:usize,
}

/// ordered block timeline backed by deduplicating event libraries. blocks hold
/// library ids only; get_block reconstructs the typed events on demand
pub struct Sequence {
    pub system:Opts,
    pub(crate) rf_library:EventLibrary,
    pub(crate) grad_library:EventLibrary,
    pub(crate) adc_library:EventLibrary,
    pub(crate) shape_library:EventLibrary,
    pub(crate) label_set_library:EventLibrary,
    pub(crate) label_inc_library:EventLibrary,
    pub(crate) extension_library:EventLibrary,
    pub(crate) blocks:Vec<BlockEntry>,
    pub definitions:BTreeMap<String,Definition>,
}

impl Sequence {
    pub fn new(system:&Opts) -> Sequence {
        let mut seq = Sequence {
            system: system.clone(),
            rf_library: EventLibrary::new(),
            grad_library: EventLibrary::new(),
            adc_library: EventLibrary::new(),
            shape_library: EventLibrary::new(),
            label_set_library: EventLibrary::new(),
            label_inc_library: EventLibrary::new(),
            extension_library: EventLibrary::new(),
            blocks: Vec::new(),
            definitions: BTreeMap::new(),
        };
        seq.set_definition("AdcRasterTime",Definition::Num(system.adc_raster_time));
        seq.set_definition("BlockDurationRaster",Definition::Num(system.block_duration_raster));
        seq.set_definition("GradientRasterTime",Definition::Num(system.grad_raster_time));
        seq.set_definition("RadiofrequencyRasterTime",Definition::Num(system.rf_raster_time));
        seq
    }

    pub fn n_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// total timeline duration in seconds
    pub fn duration(&self) -> f32 {
        self.blocks.iter().map(|b| b.duration).sum()
    }

    pub fn set_definition(&mut self,key:&str,value:Definition) {
        if key == "FOV" {
            if let Definition::Nums(vals) = &value {
                if vals.iter().any(|v| *v > 1.0) {
                    println!("warning: definition FOV uses values exceeding 1 m; interpreters expect meters");
                }
            }
        }
        self.definitions.insert(key.to_string(),value);
    }

    pub fn get_definition(&self,key:&str) -> Option<&Definition> {
        self.definitions.get(key)
    }

    /// append one block built from the given events. structural misuse (two RF
    /// pulses, two gradients on one channel) is a caller bug and panics
    pub fn add_block(&mut self,events:&[BlockEvent]) {
        let mut entry = BlockEntry::default();
        let mut labels = Vec::<Label>::new();

        for event in events {
            match event {
                BlockEvent::Rf(rf) => {
                    assert!(entry.rf == 0,"block already has an rf event");
                    entry.rf = self.register_rf_event(rf);
                }
                BlockEvent::Grad(g) => {
                    let id = self.register_trap_event(g);
                    self.assign_grad_slot(&mut entry,g.channel,id);
                }
                BlockEvent::ArbGrad(g) => {
                    let id = self.register_arb_grad_event(g);
                    self.assign_grad_slot(&mut entry,g.channel,id);
                }
                BlockEvent::Adc(adc) => {
                    assert!(entry.adc == 0,"block already has an adc event");
                    entry.adc = self.register_adc_event(adc);
                }
                BlockEvent::Delay(_) => {
                    // delays only stretch the block duration
                }
                BlockEvent::Label(label) => labels.push(*label),
            }
        }

        if !labels.is_empty() {
            entry.ext = self.register_label_chain(&labels);
        }

        entry.duration = self.system.ceil_to_block_raster(calc_duration(events));
        self.blocks.push(entry);
    }

    fn assign_grad_slot(&mut self,entry:&mut BlockEntry,channel:GradChannel,id:usize) {
        let slot = match channel {
            GradChannel::X => &mut entry.gx,
            GradChannel::Y => &mut entry.gy,
            GradChannel::Z => &mut entry.gz,
        };
        assert!(*slot == 0,"block already has a gradient on channel {}",channel.tag());
        *slot = id;
    }

    pub(crate) fn register_shape(&mut self,waveform:&[f32]) -> usize {
        let compressed = compress_shape(waveform);
        let mut row = vec![compressed.num_samples as f32];
        row.extend(compressed.data);
        self.shape_library.find_or_insert(row)
    }

    fn register_rf_event(&mut self,rf:&Rf) -> usize {
        let amp = rf.peak_amplitude();
        let mag:Vec<f32> = rf.signal.iter()
            .map(|v| if amp > 0.0 {v.norm()/amp} else {0.0})
            .collect();
        let phase:Vec<f32> = rf.signal.iter()
            .map(|v| (v.arg()/(2.0*PI)).rem_euclid(1.0))
            .collect();
        let mag_id = self.register_shape(&mag);
        let phase_id = self.register_shape(&phase);
        let row = vec![
            amp,
            mag_id as f32,
            phase_id as f32,
            0.0, // time shape id: regular raster
            rf.delay,
            rf.freq_offset,
            rf.phase_offset,
        ];
        self.rf_library.find_or_insert_tagged(row,rf.usage.tag() as u8)
    }

    fn register_trap_event(&mut self,g:&Trap) -> usize {
        let row = vec![g.amplitude,g.rise_time,g.flat_time,g.fall_time,g.delay];
        self.grad_library.find_or_insert_tagged(row,b't')
    }

    fn register_arb_grad_event(&mut self,g:&ArbitraryGrad) -> usize {
        let amp = g.amplitude();
        let shape:Vec<f32> = g.waveform.iter()
            .map(|v| if amp > 0.0 {v/amp} else {0.0})
            .collect();
        let shape_id = self.register_shape(&shape);
        let row = vec![amp,shape_id as f32,0.0,g.delay];
        self.grad_library.find_or_insert_tagged(row,b'g')
    }

    fn register_adc_event(&mut self,adc:&Adc) -> usize {
        let row = vec![
            adc.num_samples as f32,
            adc.dwell,
            adc.delay,
            adc.freq_offset,
            adc.phase_offset,
        ];
        self.adc_library.find_or_insert(row)
    }

    /// labels are stored as a linked chain of extension rows, terminated by zero
    fn register_label_chain(&mut self,labels:&[Label]) -> usize {
        let mut next = 0usize;
        for label in labels.iter().rev() {
            let lib_row = vec![label.value as f32,label.kind.index() as f32];
            let (ext_type,ref_id) = match label.op {
                LabelOp::Set => (EXT_LABEL_SET,self.label_set_library.find_or_insert(lib_row)),
                LabelOp::Inc => (EXT_LABEL_INC,self.label_inc_library.find_or_insert(lib_row)),
            };
            let ext_row = vec![ext_type as f32,ref_id as f32,next as f32];
            next = self.extension_library.find_or_insert(ext_row);
        }
        next
    }

    pub fn get_block(&self,index:usize) -> Block {
        let entry = self.blocks.get(index)
            .unwrap_or_else(|| panic!("block index {} out of range",index));
        let mut block = Block::default();
        block.duration = entry.duration;
        if entry.rf != 0 {
            block.rf = Some(self.rf_from_lib(entry.rf));
        }
        for (slot,id) in [
            (GradChannel::X,entry.gx),
            (GradChannel::Y,entry.gy),
            (GradChannel::Z,entry.gz),
        ] {
            if id != 0 {
                let g = self.grad_from_lib(id,slot);
                match slot {
                    GradChannel::X => block.gx = Some(g),
                    GradChannel::Y => block.gy = Some(g),
                    GradChannel::Z => block.gz = Some(g),
                }
            }
        }
        if entry.adc != 0 {
            let row = self.adc_library.get(entry.adc);
            block.adc = Some(Adc {
                num_samples: row[0] as u32,
                dwell: row[1],
                delay: row[2],
                freq_offset: row[3],
                phase_offset: row[4],
                dead_time: self.system.adc_dead_time,
            });
        }
        if entry.ext != 0 {
            block.labels = self.labels_from_chain(entry.ext);
        }
        block
    }

    fn rf_from_lib(&self,id:usize) -> Rf {
        let row = self.rf_library.get(id);
        let amp = row[0];
        let mag = self.shape_from_lib(row[1] as usize);
        let phase = self.shape_from_lib(row[2] as usize);
        let signal:Vec<Complex<f32>> = mag.iter().zip(phase.iter())
            .map(|(m,p)| Complex::from_polar(amp*m,2.0*PI*p))
            .collect();
        let n = signal.len();
        let t:Vec<f32> = (1..=n).map(|i| (i as f32 - 0.5)*self.system.rf_raster_time).collect();
        let usage = match self.rf_library.tag(id) as char {
            'e' => RfUse::Excitation,
            'r' => RfUse::Refocusing,
            'i' => RfUse::Inversion,
            's' => RfUse::Saturation,
            'p' => RfUse::Preparation,
            _ => RfUse::Undefined,
        };
        Rf {
            signal,
            t,
            shape_dur: n as f32*self.system.rf_raster_time,
            delay: row[4],
            freq_offset: row[5],
            phase_offset: row[6],
            dead_time: self.system.rf_dead_time,
            ringdown_time: self.system.rf_ringdown_time,
            usage,
        }
    }

    fn grad_from_lib(&self,id:usize,channel:GradChannel) -> Gradient {
        let row = self.grad_library.get(id);
        match self.grad_library.tag(id) {
            b't' => Gradient::Trap(Trap {
                channel,
                amplitude: row[0],
                rise_time: row[1],
                flat_time: row[2],
                fall_time: row[3],
                delay: row[4],
            }),
            b'g' => {
                let amp = row[0];
                let shape = self.shape_from_lib(row[1] as usize);
                Gradient::Arbitrary(ArbitraryGrad {
                    channel,
                    waveform: shape.iter().map(|v| v*amp).collect(),
                    delay: row[3],
                    raster: self.system.grad_raster_time,
                })
            }
            tag => panic!("unknown gradient library tag {}",tag),
        }
    }

    pub(crate) fn shape_from_lib(&self,id:usize) -> Vec<f32> {
        let row = self.shape_library.get(id);
        let shape = CompressedShape {
            num_samples: row[0] as usize,
            data: row[1..].to_vec(),
        };
        decompress_shape(&shape)
    }

    fn labels_from_chain(&self,head:usize) -> Vec<Label> {
        let mut out = Vec::new();
        let mut id = head;
        while id != 0 {
            let row = self.extension_library.get(id).clone();
            let (ext_type,ref_id,next) = (row[0] as u8,row[1] as usize,row[2] as usize);
            let (op,lib) = match ext_type {
                EXT_LABEL_SET => (LabelOp::Set,&self.label_set_library),
                EXT_LABEL_INC => (LabelOp::Inc,&self.label_inc_library),
                other => panic!("unknown extension type {}",other),
            };
            let lib_row = lib.get(ref_id);
            out.push(Label {
                kind: SUPPORTED_LABELS[lib_row[1] as usize],
                op,
                value: lib_row[0] as i32,
            });
            id = next;
        }
        out
    }

    /// validate raster alignment and dead-time bookkeeping of every block.
    /// returns the pass flag together with a line-per-problem report, and
    /// records the total duration as a definition like the file writer expects
    pub fn check_timing(&mut self) -> (bool,Vec<String>) {
        let mut report = Vec::<String>::new();
        let mut is_ok = true;
        let mut total = 0.0;

        for index in 0..self.blocks.len() {
            let block = self.get_block(index);
            let content = calc_duration(&block.events());
            let stored = block.duration;

            if stored + EPS < content {
                report.push(format!("block {}: stored duration {} s is shorter than its content {} s",
                    index,stored,content));
                is_ok = false;
            }
            let raster_units = stored/self.system.block_duration_raster;
            if (raster_units - raster_units.round()).abs() > 1.0E-4 {
                report.push(format!("block {}: duration {} s is off the block raster",index,stored));
                is_ok = false;
            }

            if let Some(rf) = &block.rf {
                if rf.delay + EPS < rf.dead_time {
                    report.push(format!("block {}: rf delay {} s is smaller than the rf dead time {} s",
                        index,rf.delay,rf.dead_time));
                    is_ok = false;
                }
                if rf.delay + rf.shape_dur + rf.ringdown_time > stored + EPS {
                    report.push(format!("block {}: rf pulse plus ringdown extends past the block end",index));
                    is_ok = false;
                }
            }

            if let Some(adc) = &block.adc {
                if adc.delay + EPS < adc.dead_time {
                    report.push(format!("block {}: adc delay {} s is smaller than the adc dead time {} s",
                        index,adc.delay,adc.dead_time));
                    is_ok = false;
                }
                if adc.duration() > stored + EPS {
                    report.push(format!("block {}: adc window plus dead time extends past the block end",index));
                    is_ok = false;
                }
            }

            for channel in [GradChannel::X,GradChannel::Y,GradChannel::Z] {
                if let Some(Gradient::Trap(g)) = block.gradient(channel) {
                    for (name,t) in [("delay",g.delay),("rise",g.rise_time),("flat",g.flat_time),("fall",g.fall_time)] {
                        if !self.system.on_grad_raster(t) {
                            report.push(format!("block {}: g{} {} time {} s is off the gradient raster",
                                index,channel.tag(),name,t));
                            is_ok = false;
                        }
                    }
                }
            }

            total += stored;
        }

        self.set_definition("TotalDuration",Definition::Num(total));
        (is_ok,report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grad_pulse::{TrapParams, make_trapezoid};
    use crate::adc_event::{AdcParams, make_adc};
    use crate::rf_pulse::{SincPulseParams, make_sinc_pulse_with_gz};
    use crate::delay_event::make_delay;
    use crate::label::make_label;

    fn test_system() -> Opts {
        let mut system = Opts::default();
        system.rf_dead_time = 100.0E-6;
        system.rf_ringdown_time = 20.0E-6;
        system.adc_dead_time = 10.0E-6;
        system
    }

    #[test]
    fn block_duration_rounds_to_raster(){
        let system = test_system();
        let mut seq = Sequence::new(&system);
        seq.add_block(&[BlockEvent::Delay(make_delay(123.0E-6))]);
        let stored = seq.get_block(0).duration;
        assert!((stored - 130.0E-6).abs() < 1.0E-9,"stored {}",stored);
    }

    #[test]
    fn identical_events_are_deduplicated(){
        let system = test_system();
        let mut seq = Sequence::new(&system);
        let mut params = TrapParams::new(GradChannel::X);
        params.flat_time = Some(1.0E-3);
        params.amplitude = Some(1.0E5);
        let g = make_trapezoid(&params,&system);
        seq.add_block(&[BlockEvent::Grad(g.clone())]);
        seq.add_block(&[BlockEvent::Grad(g)]);
        assert_eq!(seq.grad_library.len(),1);
        assert_eq!(seq.blocks[0].gx,seq.blocks[1].gx);
    }

    #[test]
    #[should_panic(expected = "already has a gradient")]
    fn two_gradients_on_one_channel_rejected(){
        let system = test_system();
        let mut seq = Sequence::new(&system);
        let mut params = TrapParams::new(GradChannel::X);
        params.flat_time = Some(1.0E-3);
        params.amplitude = Some(1.0E5);
        let g = make_trapezoid(&params,&system);
        seq.add_block(&[BlockEvent::Grad(g.clone()),BlockEvent::Grad(g)]);
    }

    #[test]
    fn rf_round_trips_through_libraries(){
        let system = test_system();
        let mut seq = Sequence::new(&system);
        let params = SincPulseParams {
            slice_thickness: 3.0E-3,
            apodization: 0.5,
            ..SincPulseParams::new(std::f32::consts::PI/12.0,1.0E-3)
        };
        let (rf,gz,_) = make_sinc_pulse_with_gz(&params,&system);
        seq.add_block(&[BlockEvent::Rf(rf.clone()),BlockEvent::Grad(gz)]);
        let block = seq.get_block(0);
        let rf2 = block.rf.expect("rf missing from block");
        assert_eq!(rf2.signal.len(),rf.signal.len());
        assert_eq!(rf2.usage,RfUse::Excitation);
        for (a,b) in rf2.signal.iter().zip(rf.signal.iter()) {
            assert!((a.re - b.re).abs() < rf.peak_amplitude()*1.0E-3);
        }
    }

    #[test]
    fn labels_round_trip(){
        let system = test_system();
        let mut seq = Sequence::new(&system);
        let labels = vec![
            BlockEvent::Label(make_label(LabelKind::Lin,LabelOp::Set,12)),
            BlockEvent::Label(make_label(LabelKind::Nav,LabelOp::Set,1)),
            BlockEvent::Delay(make_delay(1.0E-3)),
        ];
        seq.add_block(&labels);
        let block = seq.get_block(0);
        assert_eq!(block.labels.len(),2);
        assert_eq!(block.labels[0].kind,LabelKind::Lin);
        assert_eq!(block.labels[0].value,12);
        assert_eq!(block.labels[1].kind,LabelKind::Nav);
    }

    #[test]
    fn timing_check_passes_for_well_formed_block(){
        let system = test_system();
        let mut seq = Sequence::new(&system);
        let mut gp = TrapParams::new(GradChannel::X);
        gp.flat_time = Some(3.2E-3);
        gp.flat_area = Some(800.0);
        let gx = make_trapezoid(&gp,&system);
        let mut ap = AdcParams::new(256);
        ap.duration = Some(3.2E-3);
        ap.delay = gx.rise_time;
        let adc = make_adc(&ap,&system);
        seq.add_block(&[BlockEvent::Grad(gx),BlockEvent::Adc(adc)]);
        let (ok,report) = seq.check_timing();
        assert!(ok,"unexpected timing report: {:?}",report);
        match seq.get_definition("TotalDuration") {
            Some(Definition::Num(total)) => assert!(*total > 3.2E-3),
            other => panic!("TotalDuration not recorded: {:?}",other),
        }
    }

    #[test]
    fn timing_check_flags_bad_adc_delay(){
        let system = test_system();
        let mut seq = Sequence::new(&system);
        let mut ap = AdcParams::new(64);
        ap.dwell = Some(10.0E-6);
        let mut adc = make_adc(&ap,&system);
        adc.delay = 0.0; // violates the adc dead time
        seq.add_block(&[BlockEvent::Adc(adc)]);
        let (ok,report) = seq.check_timing();
        assert!(!ok);
        assert!(report.iter().any(|line| line.contains("adc delay")));
    }
}
