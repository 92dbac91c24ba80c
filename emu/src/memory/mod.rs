//! # Memory Map
//!
//! The ARM7TDMI sees a flat 32-bit address space. Only a handful of windows
//! are backed by storage, everything else is unmapped:
//!
//! ```text
//! ┌─────────────────────────┬────────────────────────────┬──────────┐
//! │ Range                   │ Region                     │ Size     │
//! ├─────────────────────────┼────────────────────────────┼──────────┤
//! │ 0x00000000 - 0x00003FFF │ BIOS system ROM            │ 16 KB    │
//! │ 0x02000000 - 0x0203FFFF │ On-board work RAM          │ 256 KB   │
//! │ 0x03000000 - 0x03007FFF │ On-chip work RAM           │ 32 KB    │
//! │ 0x04000000 - 0x040003FE │ I/O registers (raw bytes)  │ 1 KB     │
//! │ 0x05000000 - 0x050003FF │ Palette RAM                │ 1 KB     │
//! │ 0x06000000 - 0x06017FFF │ Video RAM                  │ 96 KB    │
//! │ 0x07000000 - 0x070003FF │ Object attributes (OAM)    │ 1 KB     │
//! │ 0x08000000 - ...        │ Cartridge ROM, wait state 0│ ROM size │
//! │ 0x0A000000 - ...        │ Cartridge ROM, wait state 1│ ROM size │
//! │ 0x0C000000 - ...        │ Cartridge ROM, wait state 2│ ROM size │
//! └─────────────────────────┴────────────────────────────┴──────────┘
//! ```
//!
//! Half-words and words are little-endian. The three cartridge windows are
//! mirrors of the same image and are read-only.

use std::fmt::{self, Display};

pub mod internal_memory;

/// Fatal memory faults. Both point at an emulation bug, so nothing retries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    /// The address is not backed by any region.
    UnmappedAccess { address: u32 },

    /// A write hit one of the cartridge ROM mirrors.
    ReadOnlyViolation { address: u32 },
}

impl Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmappedAccess { address } => {
                write!(f, "access to unmapped address 0x{address:08X}")
            }
            Self::ReadOnlyViolation { address } => {
                write!(f, "write to read-only cartridge ROM at 0x{address:08X}")
            }
        }
    }
}

impl std::error::Error for MemoryError {}

/// Backing region an address resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Bios,
    BoardWorkRam,
    ChipWorkRam,
    IoRegisters,
    PaletteRam,
    VideoRam,
    ObjectAttributes,
    CartridgeRom,
}

impl Region {
    /// Number of bytes allocated for the region. The cartridge is sized by
    /// the loaded image instead.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Bios => 0x4000,
            Self::BoardWorkRam => 0x4_0000,
            Self::ChipWorkRam => 0x8000,
            Self::IoRegisters | Self::PaletteRam | Self::ObjectAttributes => 0x400,
            Self::VideoRam => 0x1_8000,
            Self::CartridgeRom => 0,
        }
    }
}

/// Fixed windows as `(first address, last address, region)`, tested in order.
pub(crate) const FIXED_REGIONS: [(u32, u32, Region); 7] = [
    (0x0000_0000, 0x0000_3FFF, Region::Bios),
    (0x0200_0000, 0x0203_FFFF, Region::BoardWorkRam),
    (0x0300_0000, 0x0300_7FFF, Region::ChipWorkRam),
    (0x0400_0000, 0x0400_03FE, Region::IoRegisters),
    (0x0500_0000, 0x0500_03FF, Region::PaletteRam),
    (0x0600_0000, 0x0601_7FFF, Region::VideoRam),
    (0x0700_0000, 0x0700_03FF, Region::ObjectAttributes),
];

/// Base addresses of the cartridge mirrors.
pub(crate) const CARTRIDGE_MIRRORS: [u32; 3] = [0x0800_0000, 0x0A00_0000, 0x0C00_0000];

/// Entry point of every cartridge image.
pub const CARTRIDGE_ENTRY_POINT: u32 = CARTRIDGE_MIRRORS[0];
