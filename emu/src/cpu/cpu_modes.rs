//! # Processor Modes
//!
//! The mode lives in CPSR bits 4-0. Changing it is the only thing that
//! decides which physical registers back R8-R14 and which SPSR is visible:
//!
//! ```text
//! ┌────────────┬───────┬──────┬──────────────┬──────┐
//! │ Mode       │ Bits  │ Bank │ Banked regs  │ SPSR │
//! ├────────────┼───────┼──────┼──────────────┼──────┤
//! │ User       │ 10000 │  0   │ -            │ no   │
//! │ FIQ        │ 10001 │  1   │ R8-R14       │ yes  │
//! │ IRQ        │ 10010 │  2   │ R13-R14      │ yes  │
//! │ Supervisor │ 10011 │  3   │ R13-R14      │ yes  │
//! │ Abort      │ 10111 │  4   │ R13-R14      │ yes  │
//! │ Undefined  │ 11011 │  5   │ R13-R14      │ yes  │
//! │ System     │ 11111 │  6   │ same as User │ no   │
//! └────────────┴───────┴──────┴──────────────┴──────┘
//! ```

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Mode {
    /// The normal ARM program execution state.
    User = 0b10000,

    /// Designed to support a data transfer or channel process.
    Fiq = 0b10001,

    /// Used for general-purpose interrupt handling.
    Irq = 0b10010,

    /// Protected mode for the operating system
    Supervisor = 0b10011,

    /// Entered after a data or instruction prefetch abort.
    Abort = 0b10111,

    /// Entered when an undefined instruction is executed
    Undefined = 0b11011,

    /// A privileged user mode for the operating system.
    System = 0b11111,
}

impl Mode {
    /// Column of the banking table used for this mode.
    #[must_use]
    pub const fn bank_index(self) -> usize {
        match self {
            Self::User => 0,
            Self::Fiq => 1,
            Self::Irq => 2,
            Self::Supervisor => 3,
            Self::Abort => 4,
            Self::Undefined => 5,
            Self::System => 6,
        }
    }

    #[must_use]
    pub const fn is_privileged(self) -> bool {
        !matches!(self, Self::User)
    }

    #[must_use]
    pub const fn has_spsr(self) -> bool {
        !matches!(self, Self::User | Self::System)
    }
}

impl From<Mode> for u32 {
    fn from(m: Mode) -> Self {
        m as Self
    }
}

impl TryFrom<u32> for Mode {
    type Error = u32;

    /// Fails with the offending mode bits.
    fn try_from(n: u32) -> Result<Self, Self::Error> {
        match n {
            0b10000 => Ok(Self::User),
            0b10001 => Ok(Self::Fiq),
            0b10010 => Ok(Self::Irq),
            0b10011 => Ok(Self::Supervisor),
            0b10111 => Ok(Self::Abort),
            0b11011 => Ok(Self::Undefined),
            0b11111 => Ok(Self::System),
            _ => Err(n),
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "USR",
            Self::Fiq => "FIQ",
            Self::Irq => "IRQ",
            Self::Supervisor => "SVC",
            Self::Abort => "ABT",
            Self::Undefined => "UND",
            Self::System => "SYS",
        })
    }
}
