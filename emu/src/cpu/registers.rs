//! # ARM7TDMI Register File
//!
//! - **R0-R12**: general purpose (R8-R12 banked in FIQ)
//! - **R13 (SP)**: stack pointer, banked in every exception mode
//! - **R14 (LR)**: link register, banked in every exception mode
//! - **R15 (PC)**: program counter, reads as +8 (ARM) or +4 (Thumb)
//!
//! All 37 physical registers live in one flat array; the current mode picks
//! the physical slot through [`register_bank`](super::register_bank).

use crate::cpu::CpuError;
use crate::cpu::arm::alu_instruction::ArithmeticOpResult;
use crate::cpu::cpu_modes::Mode;
use crate::cpu::psr::{CpuState, Psr, RESET_VALUE};
use crate::cpu::register_bank::{BANK_MAP, CPSR_SLOT, PHYSICAL_SLOTS, SPSR_SLOTS};
use crate::memory::CARTRIDGE_ENTRY_POINT;

/// Stack Pointer register index.
pub const REG_SP: usize = 0xD;

/// Link Register index (return address for subroutines).
pub const REG_LR: usize = 0xE;

/// Program Counter register index.
pub const REG_PROGRAM_COUNTER: usize = 0xF;

pub struct RegisterFile {
    slots: [u32; PHYSICAL_SLOTS],

    /// Decoded copy of the CPSR mode field. Every CPSR write validates the
    /// field first, so this never disagrees with the slot.
    mode: Mode,
}

impl Default for RegisterFile {
    fn default() -> Self {
        let mut registers = Self {
            slots: [0; PHYSICAL_SLOTS],
            mode: Mode::Supervisor,
        };
        registers.reset();
        registers
    }
}

impl RegisterFile {
    /// Zeroes every slot, then points PC at the cartridge and enters Supervisor.
    pub fn reset(&mut self) {
        self.slots = [0; PHYSICAL_SLOTS];
        self.slots[REG_PROGRAM_COUNTER] = CARTRIDGE_ENTRY_POINT;
        self.slots[CPSR_SLOT] = RESET_VALUE;
        self.mode = Mode::Supervisor;
    }

    const fn slot(&self, reg: usize) -> usize {
        BANK_MAP[reg][self.mode.bank_index()]
    }

    /// Reads a logical register of the current mode. R15 reads as the
    /// address of the current instruction plus one pipeline stage.
    #[must_use]
    pub fn register_at(&self, reg: usize) -> u32 {
        debug_assert!(reg <= REG_PROGRAM_COUNTER, "invalid register index: {reg}");
        if reg == REG_PROGRAM_COUNTER {
            let ahead = match self.cpu_state() {
                CpuState::Arm => 8,
                CpuState::Thumb => 4,
            };
            return self.program_counter().wrapping_add(ahead);
        }

        self.slots[self.slot(reg)]
    }

    /// Writes a logical register of the current mode. R15 is stored as is.
    pub fn set_register_at(&mut self, reg: usize, new_value: u32) {
        debug_assert!(reg <= REG_PROGRAM_COUNTER, "invalid register index: {reg}");
        let slot = self.slot(reg);
        self.slots[slot] = new_value;
    }

    #[must_use]
    pub const fn program_counter(&self) -> u32 {
        self.slots[REG_PROGRAM_COUNTER]
    }

    pub const fn set_program_counter(&mut self, new_value: u32) {
        self.slots[REG_PROGRAM_COUNTER] = new_value;
    }

    pub const fn advance_program_counter(&mut self, bytes: u32) {
        self.slots[REG_PROGRAM_COUNTER] = self.slots[REG_PROGRAM_COUNTER].wrapping_add(bytes);
    }

    #[must_use]
    pub fn link_register(&self) -> u32 {
        self.register_at(REG_LR)
    }

    pub fn set_link_register(&mut self, new_value: u32) {
        self.set_register_at(REG_LR, new_value);
    }

    #[must_use]
    pub fn stack_pointer(&self) -> u32 {
        self.register_at(REG_SP)
    }

    pub fn set_stack_pointer(&mut self, new_value: u32) {
        self.set_register_at(REG_SP, new_value);
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub const fn in_privileged_mode(&self) -> bool {
        self.mode.is_privileged()
    }

    #[must_use]
    pub const fn current_mode_has_spsr(&self) -> bool {
        self.mode.has_spsr()
    }

    #[must_use]
    pub fn cpsr(&self) -> Psr {
        Psr::from(self.slots[CPSR_SLOT])
    }

    /// Replaces the CPSR. This is the only way the mode changes, and it is
    /// refused when the new mode field names no mode.
    pub fn set_cpsr(&mut self, psr: Psr) -> Result<(), CpuError> {
        let mode = psr.mode().map_err(|_| CpuError::ArchitecturalViolation {
            pc: self.program_counter(),
            reason: "CPSR mode field names no processor mode",
        })?;

        if mode != self.mode {
            tracing::debug!(from = %self.mode, to = %mode, "mode switch");
        }

        self.slots[CPSR_SLOT] = psr.into();
        self.mode = mode;
        Ok(())
    }

    fn spsr_slot(&self) -> Result<usize, CpuError> {
        SPSR_SLOTS[self.mode.bank_index()].ok_or(CpuError::ArchitecturalViolation {
            pc: self.program_counter(),
            reason: "SPSR accessed in a mode without one",
        })
    }

    pub fn spsr(&self) -> Result<Psr, CpuError> {
        Ok(Psr::from(self.slots[self.spsr_slot()?]))
    }

    pub fn set_spsr(&mut self, psr: Psr) -> Result<(), CpuError> {
        let slot = self.spsr_slot()?;
        self.slots[slot] = psr.into();
        Ok(())
    }

    /// CPSR <- SPSR, the exception return path.
    pub fn restore_cpsr_from_spsr(&mut self) -> Result<(), CpuError> {
        let spsr = self.spsr()?;
        self.set_cpsr(spsr)
    }

    fn update_cpsr(&mut self, f: impl FnOnce(&mut Psr)) {
        let mut cpsr = self.cpsr();
        f(&mut cpsr);
        debug_assert_eq!(cpsr.mode_bits(), self.cpsr().mode_bits());
        self.slots[CPSR_SLOT] = cpsr.into();
    }

    #[must_use]
    pub fn cpu_state(&self) -> CpuState {
        self.cpsr().cpu_state()
    }

    pub fn set_cpu_state(&mut self, state: CpuState) {
        self.update_cpsr(|cpsr| cpsr.set_cpu_state(state));
    }

    #[must_use]
    pub fn sign_flag(&self) -> bool {
        self.cpsr().sign_flag()
    }

    #[must_use]
    pub fn zero_flag(&self) -> bool {
        self.cpsr().zero_flag()
    }

    #[must_use]
    pub fn carry_flag(&self) -> bool {
        self.cpsr().carry_flag()
    }

    #[must_use]
    pub fn overflow_flag(&self) -> bool {
        self.cpsr().overflow_flag()
    }

    #[must_use]
    pub fn irq_disable(&self) -> bool {
        self.cpsr().irq_disable()
    }

    #[must_use]
    pub fn fiq_disable(&self) -> bool {
        self.cpsr().fiq_disable()
    }

    pub fn set_sign_flag(&mut self, value: bool) {
        self.update_cpsr(|cpsr| cpsr.set_sign_flag(value));
    }

    pub fn set_zero_flag(&mut self, value: bool) {
        self.update_cpsr(|cpsr| cpsr.set_zero_flag(value));
    }

    pub fn set_carry_flag(&mut self, value: bool) {
        self.update_cpsr(|cpsr| cpsr.set_carry_flag(value));
    }

    pub fn set_overflow_flag(&mut self, value: bool) {
        self.update_cpsr(|cpsr| cpsr.set_overflow_flag(value));
    }

    pub fn set_irq_disable(&mut self, value: bool) {
        self.update_cpsr(|cpsr| cpsr.set_irq_disable(value));
    }

    pub fn set_fiq_disable(&mut self, value: bool) {
        self.update_cpsr(|cpsr| cpsr.set_fiq_disable(value));
    }

    /// N, Z, C and V from an ALU result.
    pub fn set_flags(&mut self, op_result: &ArithmeticOpResult) {
        self.update_cpsr(|cpsr| cpsr.set_flags(op_result));
    }

    /// N and Z from a result, C from the shifter. V is left alone.
    pub fn set_logical_flags(&mut self, result: u32, carry: bool) {
        self.update_cpsr(|cpsr| {
            cpsr.set_sign_flag(result >> 31 == 1);
            cpsr.set_zero_flag(result == 0);
            cpsr.set_carry_flag(carry);
        });
    }

    /// R0-R15 as seen from the current mode, R15 being the raw PC.
    #[must_use]
    pub fn visible_registers(&self) -> [u32; 16] {
        std::array::from_fn(|reg| {
            if reg == REG_PROGRAM_COUNTER {
                self.program_counter()
            } else {
                self.register_at(reg)
            }
        })
    }
}
