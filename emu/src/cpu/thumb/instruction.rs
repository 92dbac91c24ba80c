//! # Thumb Instruction Formats
//!
//! 16-bit Thumb words are classified the same way as ARM words: an ordered
//! table walked top to bottom, first match wins.
//!
//! ```text
//! ┌────┬────────┬────────┬─────────────────────────────────────────────┐
//! │ #  │ Mask   │ Bits   │ Format                                      │
//! ├────┼────────┼────────┼─────────────────────────────────────────────┤
//! │  1 │ 0xE000 │ 0x0000 │ Shift by immediate (not op = 0b11)          │
//! │  2 │ 0xFC00 │ 0x1800 │ Add/subtract register                       │
//! │  3 │ 0xFC00 │ 0x1C00 │ Add/subtract 3-bit immediate                │
//! │  4 │ 0xE000 │ 0x2000 │ Move/compare/add/subtract 8-bit immediate   │
//! │  5 │ 0xFC00 │ 0x4000 │ Register data processing                    │
//! │  6 │ 0xFC00 │ 0x4400 │ Hi register ADD/CMP/MOV (not op = 0b11)     │
//! │  7 │ 0xFF00 │ 0x4700 │ Branch and exchange                         │
//! │  8 │ 0xF800 │ 0x4800 │ PC-relative load                            │
//! │  9 │ 0xF000 │ 0x5000 │ Load/store register offset                  │
//! │ 10 │ 0xE000 │ 0x6000 │ Load/store word/byte immediate offset       │
//! │ 11 │ 0xF000 │ 0x8000 │ Load/store halfword immediate offset        │
//! │ 12 │ 0xF000 │ 0x9000 │ SP-relative load/store                      │
//! │ 13 │ 0xF000 │ 0xA000 │ Add to SP or PC                             │
//! │ 14 │ 0xF000 │ 0xB000 │ Miscellaneous                               │
//! │ 15 │ 0xF000 │ 0xC000 │ Load/store multiple                         │
//! │ 16 │ 0xFF00 │ 0xDE00 │ Undefined                                   │
//! │ 17 │ 0xFF00 │ 0xDF00 │ Software interrupt                          │
//! │ 18 │ 0xF000 │ 0xD000 │ Conditional branch                          │
//! │ 19 │ 0xF800 │ 0xE000 │ Unconditional branch                        │
//! │ 20 │ 0xF800 │ 0xE800 │ BLX suffix                                  │
//! │ 21 │ 0xF800 │ 0xF000 │ BL/BLX prefix                               │
//! │ 22 │ 0xF800 │ 0xF800 │ BL suffix                                   │
//! └────┴────────┴────────┴─────────────────────────────────────────────┘
//! ```
//!
//! Rows 16 and 17 sit inside the mask of row 18 and have to come first.

use std::fmt::Display;

use crate::cpu::archetype::{Archetype, classify};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbModeInstruction {
    ShiftByImmediate,
    AddSubtractRegister,
    AddSubtractImmediate,
    AddSubtractCompareMoveImmediate,
    DataProcessingRegister,
    SpecialDataProcessing,
    BranchExchange,
    LoadPcRelative,
    LoadStoreRegisterOffset,
    LoadStoreWordByteImmediate,
    LoadStoreHalfwordImmediate,
    LoadStoreStack,
    AddToSpOrPc,
    Miscellaneous,
    LoadStoreMultiple,
    Undefined,
    SoftwareInterrupt,
    ConditionalBranch,
    UnconditionalBranch,
    BlxSuffix,
    BlPrefix,
    BlSuffix,
}

pub const THUMB_ARCHETYPES: [Archetype<ThumbModeInstruction>; 22] = {
    use ThumbModeInstruction::*;
    [
        Archetype::new(0xE000, 0x0000, ShiftByImmediate).excluding(0x1800, 0x1800),
        Archetype::new(0xFC00, 0x1800, AddSubtractRegister),
        Archetype::new(0xFC00, 0x1C00, AddSubtractImmediate),
        Archetype::new(0xE000, 0x2000, AddSubtractCompareMoveImmediate),
        Archetype::new(0xFC00, 0x4000, DataProcessingRegister),
        Archetype::new(0xFC00, 0x4400, SpecialDataProcessing).excluding(0x0300, 0x0300),
        Archetype::new(0xFF00, 0x4700, BranchExchange),
        Archetype::new(0xF800, 0x4800, LoadPcRelative),
        Archetype::new(0xF000, 0x5000, LoadStoreRegisterOffset),
        Archetype::new(0xE000, 0x6000, LoadStoreWordByteImmediate),
        Archetype::new(0xF000, 0x8000, LoadStoreHalfwordImmediate),
        Archetype::new(0xF000, 0x9000, LoadStoreStack),
        Archetype::new(0xF000, 0xA000, AddToSpOrPc),
        Archetype::new(0xF000, 0xB000, Miscellaneous),
        Archetype::new(0xF000, 0xC000, LoadStoreMultiple),
        Archetype::new(0xFF00, 0xDE00, Undefined),
        Archetype::new(0xFF00, 0xDF00, SoftwareInterrupt),
        Archetype::new(0xF000, 0xD000, ConditionalBranch),
        Archetype::new(0xF800, 0xE000, UnconditionalBranch),
        Archetype::new(0xF800, 0xE800, BlxSuffix),
        Archetype::new(0xF800, 0xF000, BlPrefix),
        Archetype::new(0xF800, 0xF800, BlSuffix),
    ]
};

impl ThumbModeInstruction {
    #[must_use]
    pub fn decode(op_code: u16) -> Option<Self> {
        classify(&THUMB_ARCHETYPES, op_code.into())
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ShiftByImmediate => "shift by immediate",
            Self::AddSubtractRegister => "add/subtract register",
            Self::AddSubtractImmediate => "add/subtract immediate",
            Self::AddSubtractCompareMoveImmediate => "move/compare/add/subtract immediate",
            Self::DataProcessingRegister => "register data processing",
            Self::SpecialDataProcessing => "hi register operation",
            Self::BranchExchange => "branch and exchange",
            Self::LoadPcRelative => "PC-relative load",
            Self::LoadStoreRegisterOffset => "load/store register offset",
            Self::LoadStoreWordByteImmediate => "load/store word/byte immediate offset",
            Self::LoadStoreHalfwordImmediate => "load/store halfword",
            Self::LoadStoreStack => "SP-relative load/store",
            Self::AddToSpOrPc => "load address",
            Self::Miscellaneous => "miscellaneous",
            Self::LoadStoreMultiple => "load/store multiple",
            Self::Undefined => "undefined",
            Self::SoftwareInterrupt => "software interrupt",
            Self::ConditionalBranch => "conditional branch",
            Self::UnconditionalBranch => "unconditional branch",
            Self::BlxSuffix => "BLX suffix",
            Self::BlPrefix => "BL prefix",
            Self::BlSuffix => "BL suffix",
        }
    }
}

impl Display for ThumbModeInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_formats() {
        use ThumbModeInstruction::*;

        let cases = [
            (0x0048, ShiftByImmediate),                // LSL R0, R1, #1
            (0x1888, AddSubtractRegister),             // ADD R0, R1, R2
            (0x1E48, AddSubtractImmediate),            // SUB R0, R1, #1
            (0x2005, AddSubtractCompareMoveImmediate), // MOV R0, #5
            (0x4008, DataProcessingRegister),          // AND R0, R1
            (0x4468, SpecialDataProcessing),           // ADD R0, R13
            (0x4770, BranchExchange),                  // BX LR
            (0x4801, LoadPcRelative),                  // LDR R0, [PC, #4]
            (0x5888, LoadStoreRegisterOffset),         // LDR R0, [R1, R2]
            (0x6848, LoadStoreWordByteImmediate),      // LDR R0, [R1, #4]
            (0x8848, LoadStoreHalfwordImmediate),      // LDRH R0, [R1, #2]
            (0x9801, LoadStoreStack),                  // LDR R0, [SP, #4]
            (0xA801, AddToSpOrPc),                     // ADD R0, SP, #4
            (0xB082, Miscellaneous),                   // SUB SP, #8
            (0xB500, Miscellaneous),                   // PUSH {LR}
            (0xC907, LoadStoreMultiple),               // LDMIA R1!, {R0-R2}
            (0xDE00, Undefined),
            (0xDF00, SoftwareInterrupt),
            (0xD0FE, ConditionalBranch), // BEQ .
            (0xE7FE, UnconditionalBranch), // B .
            (0xE800, BlxSuffix),
            (0xF000, BlPrefix),
            (0xF800, BlSuffix),
        ];

        for (op_code, format) in cases {
            assert_eq!(ThumbModeInstruction::decode(op_code), Some(format), "0x{op_code:04X}");
        }
    }

    #[test]
    fn every_half_word_has_a_format() {
        for op_code in 0..=u16::MAX {
            assert!(ThumbModeInstruction::decode(op_code).is_some(), "0x{op_code:04X}");
        }
    }
}
