use std::fmt::Display;

use crate::bitwise::Bits;
use crate::cpu::flags::ShiftKind;

/// Data processing opcodes, bits 24-21.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ArmModeAluInstruction {
    And = 0x0,
    Eor = 0x1,
    Sub = 0x2,
    Rsb = 0x3,
    Add = 0x4,
    Adc = 0x5,
    Sbc = 0x6,
    Rsc = 0x7,
    Tst = 0x8,
    Teq = 0x9,
    Cmp = 0xA,
    Cmn = 0xB,
    Orr = 0xC,
    Mov = 0xD,
    Bic = 0xE,
    Mvn = 0xF,
}

impl From<u32> for ArmModeAluInstruction {
    fn from(opcode: u32) -> Self {
        match opcode & 0xF {
            0x0 => Self::And,
            0x1 => Self::Eor,
            0x2 => Self::Sub,
            0x3 => Self::Rsb,
            0x4 => Self::Add,
            0x5 => Self::Adc,
            0x6 => Self::Sbc,
            0x7 => Self::Rsc,
            0x8 => Self::Tst,
            0x9 => Self::Teq,
            0xA => Self::Cmp,
            0xB => Self::Cmn,
            0xC => Self::Orr,
            0xD => Self::Mov,
            0xE => Self::Bic,
            _ => Self::Mvn,
        }
    }
}

impl Display for ArmModeAluInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = format!("{self:?}").to_uppercase();
        f.write_str(&name)
    }
}

impl ArmModeAluInstruction {
    /// TST, TEQ, CMP and CMN only exist with S set. With S clear the
    /// encoding belongs to the control and DSP extension space.
    #[must_use]
    pub const fn is_test_or_compare(self) -> bool {
        matches!(self, Self::Tst | Self::Teq | Self::Cmp | Self::Cmn)
    }
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct ArithmeticOpResult {
    pub result: u32,
    pub carry: bool,
    pub overflow: bool,
    pub sign: bool,
    pub zero: bool,
}

/// `first_op + second_op`, carry being bit 32 of the 64-bit sum.
#[must_use]
pub fn add_inner_op(first_op: u32, second_op: u32) -> ArithmeticOpResult {
    add_with_carry_inner_op(first_op, second_op, false)
}

/// `first_op + second_op + carry_in`.
#[must_use]
pub fn add_with_carry_inner_op(first_op: u32, second_op: u32, carry_in: bool) -> ArithmeticOpResult {
    let wide = u64::from(first_op) + u64::from(second_op) + u64::from(carry_in);
    let result = wide as u32;

    // Overflow only when both operands share a sign the result does not have.
    let same_sign = first_op.get_bit(31) == second_op.get_bit(31);

    ArithmeticOpResult {
        result,
        carry: wide >> 32 == 1,
        overflow: same_sign && first_op.get_bit(31) != result.get_bit(31),
        sign: result.get_bit(31),
        zero: result == 0,
    }
}

/// `first_op - second_op`, carry meaning "no borrow".
#[must_use]
pub fn sub_inner_op(first_op: u32, second_op: u32) -> ArithmeticOpResult {
    sub_with_carry_inner_op(first_op, second_op, true)
}

/// `first_op - second_op - !carry_in`, computed as `first_op + !second_op + carry_in`.
#[must_use]
pub fn sub_with_carry_inner_op(first_op: u32, second_op: u32, carry_in: bool) -> ArithmeticOpResult {
    add_with_carry_inner_op(first_op, !second_op, carry_in)
}

/// Shift encoded with a 5-bit immediate. An amount of 0 means LSR #32,
/// ASR #32 or RRX for the shifts that have no use for a zero amount.
#[must_use]
pub fn shift_by_immediate(kind: ShiftKind, amount: u32, rm: u32, carry: bool) -> ArithmeticOpResult {
    debug_assert!(amount < 32);
    let (result, carry) = match (kind, amount) {
        (ShiftKind::Lsl, 0) => (rm, carry),
        (ShiftKind::Lsl, n) => (rm << n, rm.get_bit((32 - n) as u8)),
        (ShiftKind::Lsr, 0) => (0, rm.get_bit(31)),
        (ShiftKind::Lsr, n) => (rm >> n, rm.get_bit((n - 1) as u8)),
        (ShiftKind::Asr, 0) => (sign_fill(rm), rm.get_bit(31)),
        (ShiftKind::Asr, n) => (((rm as i32) >> n) as u32, rm.get_bit((n - 1) as u8)),
        // RRX: the carry comes in at the top, bit 0 goes out.
        (ShiftKind::Ror, 0) => ((u32::from(carry) << 31) | (rm >> 1), rm.get_bit(0)),
        (ShiftKind::Ror, n) => (rm.rotate_right(n), rm.get_bit((n - 1) as u8)),
    };

    ArithmeticOpResult {
        result,
        carry,
        ..Default::default()
    }
}

/// Shift by the bottom byte of a register. Amounts of 32 and more are
/// meaningful and differ per shift kind.
#[must_use]
pub fn shift_by_register(kind: ShiftKind, amount: u32, rm: u32, carry: bool) -> ArithmeticOpResult {
    let amount = amount & 0xFF;
    let (result, carry) = match (kind, amount) {
        (_, 0) => (rm, carry),
        (ShiftKind::Lsl, 1..=31) => (rm << amount, rm.get_bit((32 - amount) as u8)),
        (ShiftKind::Lsl, 32) => (0, rm.get_bit(0)),
        (ShiftKind::Lsr, 1..=31) => (rm >> amount, rm.get_bit((amount - 1) as u8)),
        (ShiftKind::Lsr, 32) => (0, rm.get_bit(31)),
        (ShiftKind::Lsl | ShiftKind::Lsr, _) => (0, false),
        (ShiftKind::Asr, 1..=31) => (((rm as i32) >> amount) as u32, rm.get_bit((amount - 1) as u8)),
        (ShiftKind::Asr, _) => (sign_fill(rm), rm.get_bit(31)),
        (ShiftKind::Ror, _) => match amount % 32 {
            0 => (rm, rm.get_bit(31)),
            n => (rm.rotate_right(n), rm.get_bit((n - 1) as u8)),
        },
    };

    ArithmeticOpResult {
        result,
        carry,
        ..Default::default()
    }
}

/// All zeroes or all ones, following bit 31.
const fn sign_fill(value: u32) -> u32 {
    ((value as i32) >> 31) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shifted(r: ArithmeticOpResult) -> (u32, bool) {
        (r.result, r.carry)
    }

    #[test]
    fn check_add_flags() {
        let r = add_inner_op(0xFFFF_FFFF, 1);
        assert_eq!((r.result, r.carry, r.zero, r.overflow), (0, true, true, false));

        let r = add_inner_op(0x7FFF_FFFF, 1);
        assert_eq!((r.result, r.carry, r.sign, r.overflow), (0x8000_0000, false, true, true));

        let r = add_inner_op(0x8000_0000, 0x8000_0000);
        assert_eq!((r.result, r.carry, r.zero, r.overflow), (0, true, true, true));

        let r = add_inner_op(5, 3);
        assert_eq!(r, ArithmeticOpResult { result: 8, ..Default::default() });
    }

    #[test]
    fn check_sub_flags() {
        let r = sub_inner_op(5, 5);
        assert_eq!((r.result, r.carry, r.zero), (0, true, true));

        let r = sub_inner_op(3, 5);
        assert_eq!((r.result, r.carry, r.sign), (0xFFFF_FFFE, false, true));

        let r = sub_inner_op(0x8000_0000, 1);
        assert_eq!((r.result, r.carry, r.overflow), (0x7FFF_FFFF, true, true));

        let r = sub_with_carry_inner_op(5, 3, false);
        assert_eq!((r.result, r.carry), (1, true));
    }

    #[test]
    fn check_shift_by_immediate() {
        use ShiftKind::{Asr, Lsl, Lsr, Ror};

        assert_eq!(shifted(shift_by_immediate(Lsl, 0, 0x8000_0001, true)), (0x8000_0001, true));
        assert_eq!(shifted(shift_by_immediate(Lsl, 1, 0x8000_0001, false)), (2, true));
        assert_eq!(shifted(shift_by_immediate(Lsl, 31, 3, false)), (0x8000_0000, true));
        assert_eq!(shifted(shift_by_immediate(Lsr, 0, 0x8000_0000, false)), (0, true));
        assert_eq!(shifted(shift_by_immediate(Lsr, 4, 0x18, false)), (1, true));
        assert_eq!(shifted(shift_by_immediate(Asr, 0, 0x8000_0000, false)), (0xFFFF_FFFF, true));
        assert_eq!(shifted(shift_by_immediate(Asr, 0, 0x7FFF_FFFF, true)), (0, false));
        assert_eq!(shifted(shift_by_immediate(Asr, 4, 0x8000_0010, false)), (0xF800_0001, false));
        assert_eq!(shifted(shift_by_immediate(Ror, 0, 0x3, true)), (0x8000_0001, true));
        assert_eq!(shifted(shift_by_immediate(Ror, 0, 0x2, false)), (0x1, false));
        assert_eq!(shifted(shift_by_immediate(Ror, 8, 0xAABB_CCDD, false)), (0xDDAA_BBCC, true));
    }

    #[test]
    fn check_shift_by_register_boundaries() {
        use ShiftKind::{Asr, Lsl, Lsr, Ror};
        let rm = 0x8000_0001;

        for kind in [Lsl, Lsr, Asr, Ror] {
            assert_eq!(shifted(shift_by_register(kind, 0, rm, true)), (rm, true), "{kind}");
            assert_eq!(shifted(shift_by_register(kind, 0x100, rm, false)), (rm, false), "{kind}");
        }

        assert_eq!(shifted(shift_by_register(Lsl, 32, rm, false)), (0, true));
        assert_eq!(shifted(shift_by_register(Lsl, 33, rm, true)), (0, false));
        assert_eq!(shifted(shift_by_register(Lsr, 32, rm, false)), (0, true));
        assert_eq!(shifted(shift_by_register(Lsr, 200, rm, true)), (0, false));
        assert_eq!(shifted(shift_by_register(Asr, 32, rm, false)), (0xFFFF_FFFF, true));
        assert_eq!(shifted(shift_by_register(Asr, 100, 0x7000_0000, true)), (0, false));
        assert_eq!(shifted(shift_by_register(Ror, 32, rm, false)), (rm, true));
        assert_eq!(shifted(shift_by_register(Ror, 33, rm, false)), (0xC000_0000, true));
        assert_eq!(shifted(shift_by_register(Lsr, 1, rm, false)), (0x4000_0000, true));
    }

    #[test]
    fn check_alu_opcode_names() {
        assert_eq!(ArmModeAluInstruction::from(4).to_string(), "ADD");
        assert_eq!(ArmModeAluInstruction::from(13).to_string(), "MOV");
        assert!(ArmModeAluInstruction::from(0xA).is_test_or_compare());
        assert!(!ArmModeAluInstruction::Bic.is_test_or_compare());
    }
}
