use std::fmt::{self, Display};

use crate::cpu::psr::CpuState;
use crate::memory::MemoryError;

pub mod arm;

#[allow(clippy::module_name_repetitions)]
pub mod arm7tdmi;

pub mod archetype;
pub mod condition;
pub mod cpu_modes;
pub mod flags;
pub mod psr;
pub mod register_bank;
pub mod registers;
pub mod thumb;

/// Fatal CPU faults. The interpreter never resumes past one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpuError {
    /// A recognised instruction class or format with no executor.
    UnimplementedInstruction {
        raw: u32,
        pc: u32,
        class: &'static str,
    },

    /// The word matched no row of the decode table, which means the table is wrong.
    DecodeFailure { raw: u32, pc: u32, state: CpuState },

    /// Something the architecture leaves unpredictable.
    ArchitecturalViolation { pc: u32, reason: &'static str },

    Memory(MemoryError),
}

impl Display for CpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnimplementedInstruction { raw, pc, class } => write!(
                f,
                "unimplemented {class} instruction 0x{raw:08X} at 0x{pc:08X}"
            ),
            Self::DecodeFailure { raw, pc, state } => write!(
                f,
                "{state:?} instruction 0x{raw:08X} at 0x{pc:08X} fits no instruction archetype"
            ),
            Self::ArchitecturalViolation { pc, reason } => {
                write!(f, "unpredictable behaviour at 0x{pc:08X}: {reason}")
            }
            Self::Memory(e) => write!(f, "memory fault: {e}"),
        }
    }
}

impl std::error::Error for CpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Memory(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MemoryError> for CpuError {
    fn from(e: MemoryError) -> Self {
        Self::Memory(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_messages() {
        let e = CpuError::UnimplementedInstruction {
            raw: 0xEF00_0000,
            pc: 0x0800_0010,
            class: "software interrupt",
        };
        assert_eq!(
            e.to_string(),
            "unimplemented software interrupt instruction 0xEF000000 at 0x08000010"
        );

        let e = CpuError::from(MemoryError::UnmappedAccess { address: 0x1000_0000 });
        assert_eq!(e.to_string(), "memory fault: access to unmapped address 0x10000000");
        assert!(std::error::Error::source(&e).is_some());
    }
}
