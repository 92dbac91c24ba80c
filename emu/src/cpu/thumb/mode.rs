use crate::cpu::thumb::instruction::ThumbModeInstruction;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ThumbModeOpcode {
    pub instruction: ThumbModeInstruction,
    pub raw: u16,
}

impl TryFrom<u16> for ThumbModeOpcode {
    type Error = u16;

    fn try_from(op_code: u16) -> Result<Self, Self::Error> {
        Ok(Self {
            instruction: ThumbModeInstruction::decode(op_code).ok_or(op_code)?,
            raw: op_code,
        })
    }
}

impl std::ops::Deref for ThumbModeOpcode {
    type Target = u16;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

impl std::fmt::Display for ThumbModeOpcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ThumbModeInstruction::*;

        let layout = match self.instruction {
            ShiftByImmediate => "|0_0_0|Op_|__Offset_|_Rs__|_Rd__|",
            AddSubtractRegister | AddSubtractImmediate => "|0_0_0_1_1|I|O|RnOff|_Rs__|_Rd__|",
            AddSubtractCompareMoveImmediate => "|0_0_1|Op_|_Rd__|____Offset_____|",
            DataProcessingRegister => "|0_1_0_0_0_0|__Op___|_Rm__|_Rd__|",
            SpecialDataProcessing | BranchExchange => "|0_1_0_0_0_1|_Op|H|H|Rm/Hm|Rd/Hd|",
            LoadPcRelative => "|0_1_0_0_1|_Rd__|_____Word8_____|",
            LoadStoreRegisterOffset => "|0_1_0_1|L|B|S|_Ro__|_Rb__|_Rd__|",
            LoadStoreWordByteImmediate => "|0_1_1|B|L|_Offset5_|_Rb__|_Rd__|",
            LoadStoreHalfwordImmediate => "|1_0_0_0|L|_Offset5_|_Rb__|_Rd__|",
            LoadStoreStack => "|1_0_0_1|L|_Rd__|_____Word8_____|",
            AddToSpOrPc => "|1_0_1_0|S|_Rd__|_____Word8_____|",
            Miscellaneous => "|1_0_1_1|_______________________|",
            LoadStoreMultiple => "|1_1_0_0|L|_Rb__|_____Rlist_____|",
            ConditionalBranch => "|1_1_0_1|_Cond__|_____Offset____|",
            Undefined | SoftwareInterrupt => "|1_1_0_1_1_1_1|S|_____Value_____|",
            UnconditionalBranch => "|1_1_1_0_0|_______Offset11______|",
            BlxSuffix | BlPrefix | BlSuffix => "|1_1_1|H_H|_______Offset11______|",
        };

        let mut raw_bits = String::new();
        for bit in format!("{:016b}", self.raw).chars() {
            raw_bits.push(bit);
            raw_bits.push('_');
        }
        raw_bits.pop();

        writeln!(f, "INS: {}", self.instruction)?;
        writeln!(f, "RAW: |{raw_bits}|")?;
        write!(f, "FMT: {layout}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_shows_layout() {
        let op_code = ThumbModeOpcode::try_from(0x2005).unwrap();
        assert_eq!(*op_code, 0x2005);
        assert_eq!(
            op_code.to_string(),
            "INS: move/compare/add/subtract immediate\n\
             RAW: |0_0_1_0_0_0_0_0_0_0_0_0_0_1_0_1|\n\
             FMT: |0_0_1|Op_|_Rd__|____Offset_____|"
        );
    }
}
