use crate::cpu::CpuError;
use crate::cpu::arm7tdmi::{Arm7tdmi, CpuSnapshot};
use crate::memory::internal_memory::InternalMemory;

/// The console: one CPU and the memory it owns.
#[derive(Default)]
pub struct Gba {
    pub cpu: Arm7tdmi,
}

impl Gba {
    /// A console with `cartridge` loaded, ready to run from the cartridge entry point.
    #[must_use]
    pub fn new(cartridge: &[u8]) -> Self {
        let mut memory = InternalMemory::default();
        memory.load_rom(cartridge);

        Self {
            cpu: Arm7tdmi::new(memory),
        }
    }

    /// Replaces the cartridge and resets the CPU.
    pub fn load_rom(&mut self, cartridge: &[u8]) {
        self.cpu.memory.load_rom(cartridge);
        self.cpu.reset();
    }

    pub fn step(&mut self) -> Result<(), CpuError> {
        self.cpu.step()
    }

    pub fn run(&mut self) -> CpuError {
        self.cpu.run()
    }

    pub fn run_for(&mut self, steps: u64) -> Result<(), CpuError> {
        self.cpu.run_for(steps)
    }

    #[must_use]
    pub fn snapshot(&self) -> CpuSnapshot {
        self.cpu.snapshot()
    }
}
