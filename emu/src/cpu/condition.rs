//! # Condition Codes
//!
//! Every ARM instruction carries a condition in bits 31-28; in Thumb only the
//! conditional branch does (bits 11-8). The condition is checked against the
//! N, Z, C and V flags before anything else happens:
//!
//! ```text
//! ┌──────┬────────┬───────────────────────┬─────────────────┐
//! │ Code │ Suffix │ Meaning               │ Passes when     │
//! ├──────┼────────┼───────────────────────┼─────────────────┤
//! │ 0000 │ EQ     │ equal                 │ Z               │
//! │ 0001 │ NE     │ not equal             │ !Z              │
//! │ 0010 │ CS     │ unsigned higher/same  │ C               │
//! │ 0011 │ CC     │ unsigned lower        │ !C              │
//! │ 0100 │ MI     │ negative              │ N               │
//! │ 0101 │ PL     │ positive or zero      │ !N              │
//! │ 0110 │ VS     │ overflow              │ V               │
//! │ 0111 │ VC     │ no overflow           │ !V              │
//! │ 1000 │ HI     │ unsigned higher       │ C && !Z         │
//! │ 1001 │ LS     │ unsigned lower/same   │ !C || Z         │
//! │ 1010 │ GE     │ signed >=             │ N == V          │
//! │ 1011 │ LT     │ signed <              │ N != V          │
//! │ 1100 │ GT     │ signed >              │ !Z && N == V    │
//! │ 1101 │ LE     │ signed <=             │ Z || N != V     │
//! │ 1110 │ AL     │ always                │ -               │
//! │ 1111 │ NV     │ reserved              │ faults          │
//! └──────┴────────┴───────────────────────┴─────────────────┘
//! ```
//!
//! `NV` is decoded so it can be reported, but executing it is an
//! architectural violation rather than a no-op.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub enum Condition {
    EQ = 0x0,
    NE = 0x1,
    CS = 0x2,
    CC = 0x3,
    MI = 0x4,
    PL = 0x5,
    VS = 0x6,
    VC = 0x7,
    HI = 0x8,
    LS = 0x9,
    GE = 0xA,
    LT = 0xB,
    GT = 0xC,
    LE = 0xD,
    AL = 0xE,
    NV = 0xF,
}

impl From<u32> for Condition {
    /// Only the low nibble is looked at.
    fn from(code: u32) -> Self {
        match code & 0xF {
            0x0 => Self::EQ,
            0x1 => Self::NE,
            0x2 => Self::CS,
            0x3 => Self::CC,
            0x4 => Self::MI,
            0x5 => Self::PL,
            0x6 => Self::VS,
            0x7 => Self::VC,
            0x8 => Self::HI,
            0x9 => Self::LS,
            0xA => Self::GE,
            0xB => Self::LT,
            0xC => Self::GT,
            0xD => Self::LE,
            0xE => Self::AL,
            _ => Self::NV,
        }
    }
}

impl Display for Condition {
    /// `AL` prints as nothing, like an assembler would.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AL => Ok(()),
            other => write!(f, "{other:?}"),
        }
    }
}
