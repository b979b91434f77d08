use serde::{Serialize, Deserialize};

/// counters and flags that can be attached to a block to mark acquisitions
/// and steer the interpreter. counters accept SET and INC, flags accept SET
/// only. TRID identifies a block group, so it behaves like a flag: SET only
#[derive(Clone,Copy,PartialEq,Eq,Debug,Serialize,Deserialize)]
pub enum LabelKind {
    // counters
    Slc,
    Seg,
    Rep,
    Avg,
    Set,
    Eco,
    Phs,
    Lin,
    Par,
    Acq,
    // block group id, set-only
    Trid,
    // flags
    Nav,
    Rev,
    Sms,
    Ref,
    Ima,
    Off,
    Noise,
    Pmc,
    Norot,
    Nopos,
    Noscl,
    Once,
}

pub const SUPPORTED_LABELS:[LabelKind;23] = [
    LabelKind::Slc,LabelKind::Seg,LabelKind::Rep,LabelKind::Avg,LabelKind::Set,
    LabelKind::Eco,LabelKind::Phs,LabelKind::Lin,LabelKind::Par,LabelKind::Acq,
    LabelKind::Trid,
    LabelKind::Nav,LabelKind::Rev,LabelKind::Sms,LabelKind::Ref,LabelKind::Ima,
    LabelKind::Off,LabelKind::Noise,LabelKind::Pmc,LabelKind::Norot,LabelKind::Nopos,
    LabelKind::Noscl,LabelKind::Once,
];

impl LabelKind {
    pub fn is_flag(&self) -> bool {
        use LabelKind::*;
        matches!(self,Trid|Nav|Rev|Sms|Ref|Ima|Off|Noise|Pmc|Norot|Nopos|Noscl|Once)
    }
    pub fn is_counter(&self) -> bool {
        !self.is_flag()
    }
    pub fn tag(&self) -> &'static str {
        use LabelKind::*;
        match self {
            Slc => "SLC", Seg => "SEG", Rep => "REP", Avg => "AVG", Set => "SET",
            Eco => "ECO", Phs => "PHS", Lin => "LIN", Par => "PAR", Acq => "ACQ",
            Trid => "TRID",
            Nav => "NAV", Rev => "REV", Sms => "SMS", Ref => "REF", Ima => "IMA",
            Off => "OFF", Noise => "NOISE", Pmc => "PMC", Norot => "NOROT",
            Nopos => "NOPOS", Noscl => "NOSCL", Once => "ONCE",
        }
    }
    pub fn from_tag(tag:&str) -> Option<LabelKind> {
        SUPPORTED_LABELS.iter().find(|kind| kind.tag() == tag).copied()
    }
    /// index into the supported label table, used as the file reference value
    pub fn index(&self) -> usize {
        SUPPORTED_LABELS.iter().position(|kind| kind == self)
            .expect("label missing from supported table")
    }
}

#[derive(Clone,Copy,PartialEq,Eq,Debug,Serialize,Deserialize)]
pub enum LabelOp {
    Set,
    Inc,
}

#[derive(Clone,Copy,PartialEq,Eq,Debug,Serialize,Deserialize)]
pub struct Label {
    pub kind:LabelKind,
    pub op:LabelOp,
    pub value:i32,
}

pub fn make_label(kind:LabelKind,op:LabelOp,value:i32) -> Label {
    if op == LabelOp::Inc && kind.is_flag() {
        panic!("label {} is a flag and cannot be incremented",kind.tag());
    }
    Label {
        kind,
        op,
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_set_and_inc(){
        let set = make_label(LabelKind::Rep,LabelOp::Set,5);
        assert_eq!(set.value,5);
        let inc = make_label(LabelKind::Rep,LabelOp::Inc,1);
        assert_eq!(inc.op,LabelOp::Inc);
        assert!(LabelKind::Rep.is_counter());
    }

    #[test]
    fn flag_set_allowed(){
        let nav = make_label(LabelKind::Nav,LabelOp::Set,1);
        assert!(nav.kind.is_flag());
    }

    #[test]
    #[should_panic(expected = "cannot be incremented")]
    fn flag_inc_rejected(){
        make_label(LabelKind::Nav,LabelOp::Inc,1);
    }

    #[test]
    #[should_panic(expected = "cannot be incremented")]
    fn trid_inc_rejected(){
        // TRID takes arbitrary SET values but is not a counter
        make_label(LabelKind::Trid,LabelOp::Inc,1);
    }

    #[test]
    fn trid_set_allowed(){
        let trid = make_label(LabelKind::Trid,LabelOp::Set,7);
        assert_eq!(trid.value,7);
    }

    #[test]
    fn tags_round_trip(){
        for kind in SUPPORTED_LABELS.iter() {
            assert_eq!(LabelKind::from_tag(kind.tag()),Some(*kind));
        }
    }
}
