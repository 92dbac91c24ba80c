//! # ARM Instruction Classes
//!
//! A 32-bit ARM word is classified by walking [`ARM_ARCHETYPES`] from the
//! top. The masks overlap (data processing and the miscellaneous space share
//! bits 27-25 = 000, for example), so the order of the rows is part of the
//! decoding rules and must not be changed:
//!
//! ```text
//! ┌────┬────────────┬────────────┬───────────────────────────────────────┐
//! │ #  │ Mask       │ Bits       │ Class                                 │
//! ├────┼────────────┼────────────┼───────────────────────────────────────┤
//! │  1 │ 0x0E000010 │ 0x00000000 │ Data processing, immediate shift      │
//! │  2 │ 0x0F900010 │ 0x01000000 │ Miscellaneous                         │
//! │  3 │ 0x0E000090 │ 0x00000010 │ Data processing, register shift (*)   │
//! │  4 │ 0x0F900090 │ 0x01000010 │ Miscellaneous                         │
//! │  5 │ 0x0E000090 │ 0x00000090 │ Multiply / extra load-store           │
//! │  6 │ 0x0E000000 │ 0x02000000 │ Data processing, immediate (*)        │
//! │  7 │ 0x0FB00000 │ 0x03000000 │ Undefined                             │
//! │  8 │ 0x0FB00000 │ 0x03200000 │ Move immediate to status register     │
//! │  9 │ 0x0E000000 │ 0x04000000 │ Load/store, immediate offset          │
//! │ 10 │ 0x0E000010 │ 0x06000000 │ Load/store, register offset           │
//! │ 11 │ 0x0E000010 │ 0x06000010 │ Media                                 │
//! │ 12 │ 0x0FF000F0 │ 0x07F000F0 │ Architecturally undefined             │
//! │ 13 │ 0x0E000000 │ 0x08000000 │ Load/store multiple                   │
//! │ 14 │ 0x0E000000 │ 0x0A000000 │ Branch / branch with link             │
//! │ 15 │ 0x0E000000 │ 0x0C000000 │ Coprocessor load/store                │
//! │ 16 │ 0x0F000010 │ 0x0E000000 │ Coprocessor data processing           │
//! │ 17 │ 0x0F000010 │ 0x0E000010 │ Coprocessor register transfer         │
//! │ 18 │ 0x0F000000 │ 0x0F000000 │ Software interrupt                    │
//! └────┴────────────┴────────────┴───────────────────────────────────────┘
//!   (*) except when bits 24,23,20 are 1,0,0 (test/compare without S)
//! ```
//!
//! The condition field is not part of any pattern.

use std::fmt::Display;

use crate::cpu::archetype::{Archetype, classify};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmModeInstruction {
    DataProcessingImmediateShift,
    Miscellaneous,
    DataProcessingRegisterShift,
    MultiplyOrExtraLoadStore,
    DataProcessingImmediate,
    Undefined,
    MoveImmediateToStatusRegister,
    LoadStoreImmediateOffset,
    LoadStoreRegisterOffset,
    Media,
    ArchitecturallyUndefined,
    LoadStoreMultiple,
    Branch,
    CoprocessorLoadStore,
    CoprocessorDataProcessing,
    CoprocessorRegisterTransfer,
    SoftwareInterrupt,
}

/// Bits 24, 23 and 20 equal to 1, 0, 0: an opcode in 8..=11 with S clear.
const TEST_WITHOUT_S: (u32, u32) = (0x0190_0000, 0x0100_0000);

pub const ARM_ARCHETYPES: [Archetype<ArmModeInstruction>; 18] = {
    use ArmModeInstruction::*;
    let (mask, bits) = TEST_WITHOUT_S;
    [
        Archetype::new(0x0E00_0010, 0x0000_0000, DataProcessingImmediateShift),
        Archetype::new(0x0F90_0010, 0x0100_0000, Miscellaneous),
        Archetype::new(0x0E00_0090, 0x0000_0010, DataProcessingRegisterShift).excluding(mask, bits),
        Archetype::new(0x0F90_0090, 0x0100_0010, Miscellaneous),
        Archetype::new(0x0E00_0090, 0x0000_0090, MultiplyOrExtraLoadStore),
        Archetype::new(0x0E00_0000, 0x0200_0000, DataProcessingImmediate).excluding(mask, bits),
        Archetype::new(0x0FB0_0000, 0x0300_0000, Undefined),
        Archetype::new(0x0FB0_0000, 0x0320_0000, MoveImmediateToStatusRegister),
        Archetype::new(0x0E00_0000, 0x0400_0000, LoadStoreImmediateOffset),
        Archetype::new(0x0E00_0010, 0x0600_0000, LoadStoreRegisterOffset),
        Archetype::new(0x0E00_0010, 0x0600_0010, Media),
        Archetype::new(0x0FF0_00F0, 0x07F0_00F0, ArchitecturallyUndefined),
        Archetype::new(0x0E00_0000, 0x0800_0000, LoadStoreMultiple),
        Archetype::new(0x0E00_0000, 0x0A00_0000, Branch),
        Archetype::new(0x0E00_0000, 0x0C00_0000, CoprocessorLoadStore),
        Archetype::new(0x0F00_0010, 0x0E00_0000, CoprocessorDataProcessing),
        Archetype::new(0x0F00_0010, 0x0E00_0010, CoprocessorRegisterTransfer),
        Archetype::new(0x0F00_0000, 0x0F00_0000, SoftwareInterrupt),
    ]
};

impl ArmModeInstruction {
    /// Class of an ARM word, `None` when no row of the table accepts it.
    #[must_use]
    pub fn decode(op_code: u32) -> Option<Self> {
        classify(&ARM_ARCHETYPES, op_code)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DataProcessingImmediateShift => "data processing (immediate shift)",
            Self::Miscellaneous => "miscellaneous",
            Self::DataProcessingRegisterShift => "data processing (register shift)",
            Self::MultiplyOrExtraLoadStore => "multiply / extra load-store",
            Self::DataProcessingImmediate => "data processing (immediate)",
            Self::Undefined => "undefined",
            Self::MoveImmediateToStatusRegister => "move immediate to status register",
            Self::LoadStoreImmediateOffset => "load/store (immediate offset)",
            Self::LoadStoreRegisterOffset => "load/store (register offset)",
            Self::Media => "media",
            Self::ArchitecturallyUndefined => "architecturally undefined",
            Self::LoadStoreMultiple => "load/store multiple",
            Self::Branch => "branch",
            Self::CoprocessorLoadStore => "coprocessor load/store",
            Self::CoprocessorDataProcessing => "coprocessor data processing",
            Self::CoprocessorRegisterTransfer => "coprocessor register transfer",
            Self::SoftwareInterrupt => "software interrupt",
        }
    }
}

impl Display for ArmModeInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_data_processing() {
        // MOV R0, #5
        assert_eq!(
            ArmModeInstruction::decode(0xE3A0_0005),
            Some(ArmModeInstruction::DataProcessingImmediate)
        );
        // ADD R0, R1, R2, LSL #3
        assert_eq!(
            ArmModeInstruction::decode(0xE081_0182),
            Some(ArmModeInstruction::DataProcessingImmediateShift)
        );
        // MOV R0, R1, LSL R2
        assert_eq!(
            ArmModeInstruction::decode(0xE1A0_0211),
            Some(ArmModeInstruction::DataProcessingRegisterShift)
        );
        // MRS R0, CPSR falls in the immediate shift row first.
        assert_eq!(
            ArmModeInstruction::decode(0xE10F_0000),
            Some(ArmModeInstruction::DataProcessingImmediateShift)
        );
    }

    #[test]
    fn decode_miscellaneous_and_status() {
        // BX R0
        assert_eq!(
            ArmModeInstruction::decode(0xE12F_FF10),
            Some(ArmModeInstruction::Miscellaneous)
        );
        // MSR CPSR_f, #0xF0000000
        assert_eq!(
            ArmModeInstruction::decode(0xE328_F20F),
            Some(ArmModeInstruction::MoveImmediateToStatusRegister)
        );
        // MUL R0, R1, R2
        assert_eq!(
            ArmModeInstruction::decode(0xE000_0291),
            Some(ArmModeInstruction::MultiplyOrExtraLoadStore)
        );
    }

    #[test]
    fn decode_transfers_and_branches() {
        let cases = [
            (0xE591_0004, ArmModeInstruction::LoadStoreImmediateOffset), // LDR R0, [R1, #4]
            (0xE791_0002, ArmModeInstruction::LoadStoreRegisterOffset),  // LDR R0, [R1, R2]
            (0xE891_000E, ArmModeInstruction::LoadStoreMultiple),        // LDMIA R1, {R1-R3}
            (0xEAFF_FFFE, ArmModeInstruction::Branch),                   // B .
            (0xEBFF_FFFC, ArmModeInstruction::Branch),                   // BL -8
            (0xEF00_0000, ArmModeInstruction::SoftwareInterrupt),
            (0xEE00_0000, ArmModeInstruction::CoprocessorDataProcessing),
            (0xEE00_0010, ArmModeInstruction::CoprocessorRegisterTransfer),
            (0xED90_0000, ArmModeInstruction::CoprocessorLoadStore),
            (0xE7F0_00F0, ArmModeInstruction::Media),
            (0xE300_0000, ArmModeInstruction::Undefined),
        ];

        for (op_code, class) in cases {
            assert_eq!(ArmModeInstruction::decode(op_code), Some(class), "0x{op_code:08X}");
        }
    }

    #[test]
    fn every_word_has_a_class() {
        // Bits 27-20 and 7-4 select the row; sweep all of them.
        for high in 0..=0xFF_u32 {
            for low in 0..=0xF_u32 {
                let op_code = 0xE000_0000 | (high << 20) | (low << 4);
                assert!(ArmModeInstruction::decode(op_code).is_some(), "0x{op_code:08X}");
            }
        }
    }
}
