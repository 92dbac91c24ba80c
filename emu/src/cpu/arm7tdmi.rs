//! # ARM7TDMI Execution Context
//!
//! [`Arm7tdmi`] owns the register file and the memory it executes from. One
//! call to [`Arm7tdmi::step`] fetches the instruction at PC, classifies it,
//! runs its executor and then moves PC to the next instruction:
//!
//! ```text
//!   fetch (PC aligned) ──▶ classify ──▶ execute ──▶ PC += 4 (ARM) / 2 (Thumb)
//!                                          │
//!                                          └── redirected? skip the increment
//! ```
//!
//! Executors that move PC themselves (branches, loads into R15, data
//! processing with R15 as destination) go through [`Arm7tdmi::redirect_pc`],
//! which suppresses the increment for the current step only.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::CpuError;
use crate::cpu::arm::mode::ArmModeOpcode;
use crate::cpu::condition::Condition;
use crate::cpu::cpu_modes::Mode;
use crate::cpu::psr::CpuState;
use crate::cpu::registers::{REG_PROGRAM_COUNTER, RegisterFile};
use crate::cpu::thumb::mode::ThumbModeOpcode;
use crate::memory::internal_memory::InternalMemory;

pub const SIZE_OF_ARM_INSTRUCTION: u32 = 4;
pub const SIZE_OF_THUMB_INSTRUCTION: u32 = 2;

#[derive(Default)]
pub struct Arm7tdmi {
    pub memory: InternalMemory,
    pub registers: RegisterFile,

    /// Set by [`Arm7tdmi::redirect_pc`], consumed at the end of the step.
    pc_redirected: bool,
}

/// Architectural state visible to a program, as captured between two steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuSnapshot {
    /// R0-R15 of the current mode. R15 is the address of the next fetch.
    pub registers: [u32; 16],
    pub cpsr: u32,
    pub spsr: Option<u32>,
    pub mode: Mode,
    pub state: CpuState,
}

impl Arm7tdmi {
    #[must_use]
    pub fn new(memory: InternalMemory) -> Self {
        Self {
            memory,
            registers: RegisterFile::default(),
            pc_redirected: false,
        }
    }

    /// Back to the reset state. Memory is left as it is.
    pub fn reset(&mut self) {
        self.registers.reset();
        self.pc_redirected = false;
    }

    pub fn fetch_arm(&mut self) -> Result<u32, CpuError> {
        let mut pc = self.registers.program_counter();
        pc.set_bits(0..=1, 0);
        self.registers.set_program_counter(pc);

        Ok(self.memory.read_word(pc)?)
    }

    pub fn fetch_thumb(&mut self) -> Result<u16, CpuError> {
        let mut pc = self.registers.program_counter();
        pc.set_bit_off(0);
        self.registers.set_program_counter(pc);

        Ok(self.memory.read_half_word(pc)?)
    }

    pub fn decode_arm(&self, raw: u32) -> Result<ArmModeOpcode, CpuError> {
        let pc = self.registers.program_counter();
        let op_code = ArmModeOpcode::try_from(raw).map_err(|raw| CpuError::DecodeFailure {
            raw,
            pc,
            state: CpuState::Arm,
        })?;

        tracing::trace!("0x{pc:08X}: 0x{raw:08X} {}", op_code.instruction);
        Ok(op_code)
    }

    pub fn decode_thumb(&self, raw: u16) -> Result<ThumbModeOpcode, CpuError> {
        let pc = self.registers.program_counter();
        let op_code = ThumbModeOpcode::try_from(raw).map_err(|raw| CpuError::DecodeFailure {
            raw: raw.into(),
            pc,
            state: CpuState::Thumb,
        })?;

        tracing::trace!("0x{pc:08X}: 0x{raw:04X} {}", op_code.instruction);
        Ok(op_code)
    }

    /// Executes exactly one instruction.
    pub fn step(&mut self) -> Result<(), CpuError> {
        self.pc_redirected = false;

        let size = match self.registers.cpu_state() {
            CpuState::Arm => {
                let raw = self.fetch_arm()?;
                let op_code = self.decode_arm(raw)?;
                self.execute_arm(op_code)?;
                SIZE_OF_ARM_INSTRUCTION
            }
            CpuState::Thumb => {
                let raw = self.fetch_thumb()?;
                let op_code = self.decode_thumb(raw)?;
                self.execute_thumb(op_code)?;
                SIZE_OF_THUMB_INSTRUCTION
            }
        };

        if !std::mem::take(&mut self.pc_redirected) {
            self.registers.advance_program_counter(size);
        }

        Ok(())
    }

    /// Steps until something goes wrong and hands back what it was.
    pub fn run(&mut self) -> CpuError {
        loop {
            if let Err(e) = self.step() {
                return e;
            }
        }
    }

    /// Executes at most `steps` instructions.
    pub fn run_for(&mut self, steps: u64) -> Result<(), CpuError> {
        for _ in 0..steps {
            self.step()?;
        }

        Ok(())
    }

    #[must_use]
    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            registers: self.registers.visible_registers(),
            cpsr: self.registers.cpsr().into(),
            spsr: self.registers.spsr().ok().map(u32::from),
            mode: self.registers.mode(),
            state: self.registers.cpu_state(),
        }
    }

    /// Moves PC to `target` and keeps it there when the step ends.
    pub(crate) fn redirect_pc(&mut self, target: u32) {
        tracing::debug!(
            "redirect 0x{:08X} -> 0x{target:08X}",
            self.registers.program_counter()
        );
        self.registers.set_program_counter(target);
        self.pc_redirected = true;
    }

    /// Instruction set from bit 0 of `target`, PC from the rest.
    pub(crate) fn exchange_to(&mut self, target: u32) {
        self.registers.set_cpu_state(CpuState::from(target.get_bit(0)));
        self.redirect_pc(target & !1);
    }

    /// `NV` is reserved and faults instead of failing silently.
    pub(crate) fn condition_passed(&self, condition: Condition) -> Result<bool, CpuError> {
        if condition == Condition::NV {
            return Err(self.violation("condition field 0b1111 is reserved"));
        }

        Ok(self.registers.cpsr().can_execute(condition))
    }

    /// Base register update of an addressing mode.
    pub(crate) fn write_back(&mut self, rn: usize, value: u32) -> Result<(), CpuError> {
        if rn == REG_PROGRAM_COUNTER {
            return Err(self.violation("base writeback to R15"));
        }

        self.registers.set_register_at(rn, value);
        Ok(())
    }

    pub(crate) fn unimplemented(&self, raw: u32, class: &'static str) -> CpuError {
        CpuError::UnimplementedInstruction {
            raw,
            pc: self.registers.program_counter(),
            class,
        }
    }

    pub(crate) fn violation(&self, reason: &'static str) -> CpuError {
        CpuError::ArchitecturalViolation {
            pc: self.registers.program_counter(),
            reason,
        }
    }
}

#[cfg(test)]
impl Arm7tdmi {
    /// A CPU whose cartridge holds `words`, starting at the entry point in ARM state.
    pub(crate) fn with_arm_program(words: &[u32]) -> Self {
        let image: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        let mut memory = InternalMemory::default();
        memory.load_rom(&image);
        Self::new(memory)
    }

    /// Same as [`Arm7tdmi::with_arm_program`] but in Thumb state.
    pub(crate) fn with_thumb_program(half_words: &[u16]) -> Self {
        let image: Vec<u8> = half_words.iter().flat_map(|h| h.to_le_bytes()).collect();
        let mut memory = InternalMemory::default();
        memory.load_rom(&image);
        let mut cpu = Self::new(memory);
        cpu.registers.set_cpu_state(CpuState::Thumb);
        cpu
    }
}
