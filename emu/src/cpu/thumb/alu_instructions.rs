use crate::cpu::flags::ShiftKind;

/// Register data processing opcodes, bits 9-6 of `010000 op Rm Rd`.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum ThumbModeAluInstruction {
    And = 0x0,
    Eor = 0x1,
    Lsl = 0x2,
    Lsr = 0x3,
    Asr = 0x4,
    Adc = 0x5,
    Sbc = 0x6,
    Ror = 0x7,
    Tst = 0x8,
    Neg = 0x9,
    Cmp = 0xA,
    Cmn = 0xB,
    Orr = 0xC,
    Mul = 0xD,
    Bic = 0xE,
    Mvn = 0xF,
}

impl From<u16> for ThumbModeAluInstruction {
    fn from(alu_op_code: u16) -> Self {
        use ThumbModeAluInstruction::*;
        match alu_op_code & 0xF {
            0x0 => And,
            0x1 => Eor,
            0x2 => Lsl,
            0x3 => Lsr,
            0x4 => Asr,
            0x5 => Adc,
            0x6 => Sbc,
            0x7 => Ror,
            0x8 => Tst,
            0x9 => Neg,
            0xA => Cmp,
            0xB => Cmn,
            0xC => Orr,
            0xD => Mul,
            0xE => Bic,
            _ => Mvn,
        }
    }
}

impl ThumbModeAluInstruction {
    /// The shift opcodes take their amount from the bottom byte of Rm.
    #[must_use]
    pub const fn register_shift(self) -> Option<ShiftKind> {
        match self {
            Self::Lsl => Some(ShiftKind::Lsl),
            Self::Lsr => Some(ShiftKind::Lsr),
            Self::Asr => Some(ShiftKind::Asr),
            Self::Ror => Some(ShiftKind::Ror),
            _ => None,
        }
    }
}

/// Bits 9-8 of `010001 op H1 H2 Rm Rd`. `BxOrBlx` is routed to its own
/// class by the decode table and never reaches the hi register executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThumbHighRegisterOperation {
    Add,
    Cmp,
    Mov,
    BxOrBlx,
}

impl From<u16> for ThumbHighRegisterOperation {
    fn from(op: u16) -> Self {
        match op & 0b11 {
            0 => Self::Add,
            1 => Self::Cmp,
            2 => Self::Mov,
            _ => Self::BxOrBlx,
        }
    }
}
