//! # Program Status Registers (CPSR and SPSR)
//!
//! ```text
//! 31 30 29 28 27       8 7 6 5 4   0
//! ┌──┬──┬──┬──┬──────────┬─┬─┬─┬─────┐
//! │N │Z │C │V │ Reserved │F│I│T│Mode │
//! └──┴──┴──┴──┴──────────┴─┴─┴─┴─────┘
//! ```
//!
//! - **Flags (28-31)**: tested by [`condition`](super::condition)
//! - **F/I (7-6)**: FIQ/IRQ disable
//! - **T (5)**: ARM (0) or Thumb (1) state
//! - **Mode (4-0)**: see [`cpu_modes`](super::cpu_modes)

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::arm::alu_instruction::ArithmeticOpResult;
use crate::cpu::{condition::Condition, cpu_modes::Mode};

/// Bits software may never set through MSR.
pub const UNALLOCATED_MASK: u32 = 0x0FFF_FF00;

/// Condition flags, writable from any mode.
pub const USER_MASK: u32 = 0xF000_0000;

/// Interrupt masks and mode field, writable from privileged modes.
pub const PRIVILEGED_MASK: u32 = 0x0000_00DF;

/// Execution state bit.
pub const STATE_MASK: u32 = 0x0000_0020;

/// CPSR value after reset: Supervisor, IRQ and FIQ masked, ARM state.
pub const RESET_VALUE: u32 = 0x0000_00D3;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    #[default]
    Arm,
    Thumb,
}

impl From<bool> for CpuState {
    fn from(thumb: bool) -> Self {
        if thumb { Self::Thumb } else { Self::Arm }
    }
}

/// Program Status Register, used for both the CPSR and the SPSRs.
///
/// ```
/// use emu::cpu::psr::Psr;
///
/// let mut cpsr = Psr::from(0);
/// cpsr.set_zero_flag(true);
/// assert!(cpsr.zero_flag());
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Psr(u32);

impl Psr {
    /// Evaluates a condition against N, Z, C and V. `NV` never passes; callers
    /// that must fault on it check for it first.
    #[must_use]
    pub fn can_execute(self, cond: Condition) -> bool {
        use Condition::{AL, CC, CS, EQ, GE, GT, HI, LE, LS, LT, MI, NE, NV, PL, VC, VS};
        match cond {
            EQ => self.zero_flag(),
            NE => !self.zero_flag(),
            CS => self.carry_flag(),
            CC => !self.carry_flag(),
            MI => self.sign_flag(),
            PL => !self.sign_flag(),
            VS => self.overflow_flag(),
            VC => !self.overflow_flag(),
            HI => self.carry_flag() && !self.zero_flag(),
            LS => !self.carry_flag() || self.zero_flag(),
            GE => self.sign_flag() == self.overflow_flag(),
            LT => self.sign_flag() != self.overflow_flag(),
            GT => !self.zero_flag() && (self.sign_flag() == self.overflow_flag()),
            LE => self.zero_flag() || (self.sign_flag() != self.overflow_flag()),
            AL => true,
            NV => false,
        }
    }

    /// N => Bit 31
    #[must_use]
    pub fn sign_flag(self) -> bool {
        self.0.get_bit(31)
    }

    /// Z => Bit 30
    #[must_use]
    pub fn zero_flag(self) -> bool {
        self.0.get_bit(30)
    }

    /// C => Bit 29
    #[must_use]
    pub fn carry_flag(self) -> bool {
        self.0.get_bit(29)
    }

    /// V => Bit 28
    #[must_use]
    pub fn overflow_flag(self) -> bool {
        self.0.get_bit(28)
    }

    /// F => Bit 7
    #[must_use]
    pub fn fiq_disable(self) -> bool {
        self.0.get_bit(7)
    }

    /// I => Bit 6
    #[must_use]
    pub fn irq_disable(self) -> bool {
        self.0.get_bit(6)
    }

    /// T => Bit 5
    #[must_use]
    pub fn state_bit(self) -> bool {
        self.0.get_bit(5)
    }

    #[must_use]
    pub fn cpu_state(self) -> CpuState {
        self.state_bit().into()
    }

    /// M4-M0 => Bits 4-0, undecoded.
    #[must_use]
    pub fn mode_bits(self) -> u32 {
        self.0.get_bits(0..=4)
    }

    /// Decodes the mode field, failing with the raw bits when they name no mode.
    pub fn mode(self) -> Result<Mode, u32> {
        Mode::try_from(self.mode_bits())
    }

    pub fn set_sign_flag(&mut self, value: bool) {
        self.0.set_bit(31, value);
    }

    pub fn set_zero_flag(&mut self, value: bool) {
        self.0.set_bit(30, value);
    }

    pub fn set_carry_flag(&mut self, value: bool) {
        self.0.set_bit(29, value);
    }

    pub fn set_overflow_flag(&mut self, value: bool) {
        self.0.set_bit(28, value);
    }

    pub fn set_fiq_disable(&mut self, value: bool) {
        self.0.set_bit(7, value);
    }

    pub fn set_irq_disable(&mut self, value: bool) {
        self.0.set_bit(6, value);
    }

    pub fn set_cpu_state(&mut self, state: CpuState) {
        self.0.set_bit(5, state == CpuState::Thumb);
    }

    /// Copies N, Z, C and V from an ALU result.
    pub fn set_flags(&mut self, op_result: &ArithmeticOpResult) {
        self.set_sign_flag(op_result.sign);
        self.set_zero_flag(op_result.zero);
        self.set_carry_flag(op_result.carry);
        self.set_overflow_flag(op_result.overflow);
    }
}

impl From<u32> for Psr {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Psr> for u32 {
    fn from(psr: Psr) -> Self {
        psr.0
    }
}

impl From<Mode> for Psr {
    fn from(mode: Mode) -> Self {
        Self(mode.into())
    }
}

impl Display for Psr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |set: bool, c: char| if set { c } else { '-' };
        write!(
            f,
            "{}{}{}{}{}{}{} ",
            flag(self.sign_flag(), 'N'),
            flag(self.zero_flag(), 'Z'),
            flag(self.carry_flag(), 'C'),
            flag(self.overflow_flag(), 'V'),
            flag(self.fiq_disable(), 'F'),
            flag(self.irq_disable(), 'I'),
            flag(self.state_bit(), 'T'),
        )?;
        match self.mode() {
            Ok(mode) => write!(f, "{mode}"),
            Err(bits) => write!(f, "?{bits:05b}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn psr_with_flags(n: bool, z: bool, c: bool, v: bool) -> Psr {
        let mut psr = Psr::from(Mode::User);
        psr.set_sign_flag(n);
        psr.set_zero_flag(z);
        psr.set_carry_flag(c);
        psr.set_overflow_flag(v);
        psr
    }

    #[test]
    fn test_condition_truth_table() {
        for flags in 0..16_u32 {
            let (n, z, c, v) = (flags & 8 != 0, flags & 4 != 0, flags & 2 != 0, flags & 1 != 0);
            let psr = psr_with_flags(n, z, c, v);

            let expected = [
                (Condition::EQ, z),
                (Condition::NE, !z),
                (Condition::CS, c),
                (Condition::CC, !c),
                (Condition::MI, n),
                (Condition::PL, !n),
                (Condition::VS, v),
                (Condition::VC, !v),
                (Condition::HI, c && !z),
                (Condition::LS, !c || z),
                (Condition::GE, n == v),
                (Condition::LT, n != v),
                (Condition::GT, !z && n == v),
                (Condition::LE, z || n != v),
                (Condition::AL, true),
            ];

            for (cond, passes) in expected {
                assert_eq!(psr.can_execute(cond), passes, "{cond:?} with NZCV={flags:04b}");
            }
        }
    }

    #[test]
    fn test_flag_bits() {
        let mut psr = Psr::from(0);
        psr.set_sign_flag(true);
        psr.set_overflow_flag(true);
        assert_eq!(u32::from(psr), 0x9000_0000);

        psr.set_sign_flag(false);
        psr.set_zero_flag(true);
        psr.set_carry_flag(true);
        assert_eq!(u32::from(psr), 0x7000_0000);
    }

    #[test]
    fn test_control_bits() {
        let psr = Psr::from(RESET_VALUE);
        assert_eq!(psr.mode(), Ok(Mode::Supervisor));
        assert!(psr.irq_disable());
        assert!(psr.fiq_disable());
        assert_eq!(psr.cpu_state(), CpuState::Arm);

        let mut psr = Psr::from(Mode::System);
        psr.set_cpu_state(CpuState::Thumb);
        psr.set_irq_disable(true);
        assert_eq!(u32::from(psr), 0b0111_1111);
        assert_eq!(psr.to_string(), "-----IT SYS");

        psr.set_irq_disable(false);
        psr.set_fiq_disable(true);
        assert_eq!(u32::from(psr), 0b1011_1111);
        assert_eq!(psr.to_string(), "----F-T SYS");
    }

    #[test]
    fn test_invalid_mode_bits() {
        assert_eq!(Psr::from(0).mode(), Err(0));
        assert_eq!(Psr::from(0).to_string(), "------- ?00000");
    }
}
