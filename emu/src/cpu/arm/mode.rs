use crate::bitwise::Bits;
use crate::cpu::arm::instructions::ArmModeInstruction;
use crate::cpu::condition::Condition;

/// A fetched ARM word together with its class and condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmModeOpcode {
    pub instruction: ArmModeInstruction,
    pub condition: Condition,
    pub raw: u32,
}

impl TryFrom<u32> for ArmModeOpcode {
    type Error = u32;

    /// Fails with the raw word when no class accepts it.
    fn try_from(op_code: u32) -> Result<Self, Self::Error> {
        let instruction = ArmModeInstruction::decode(op_code).ok_or(op_code)?;
        Ok(Self {
            instruction,
            condition: Condition::from(op_code.get_bits(28..=31)),
            raw: op_code,
        })
    }
}

impl std::ops::Deref for ArmModeOpcode {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

impl std::fmt::Display for ArmModeOpcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ArmModeInstruction::*;

        let layout = match self.instruction {
            DataProcessingImmediateShift => "|_Cond__|0_0_0|_code__|S|__Rn___|__Rd___|_shift___|sh_|0|__Rm___|",
            DataProcessingRegisterShift => "|_Cond__|0_0_0|_code__|S|__Rn___|__Rd___|__Rs___|0|sh_|1|__Rm___|",
            DataProcessingImmediate => "|_Cond__|0_0_1|_code__|S|__Rn___|__Rd___|_rot___|_____imm8______|",
            Miscellaneous => "|_Cond__|0_0_0_1_0|R|0|f|_mask__|__Rd___|_______|_op____|__Rm___|",
            MoveImmediateToStatusRegister => "|_Cond__|0_0_1_1_0|R|1_0|_mask__|1_1_1_1|_rot___|_____imm8______|",
            LoadStoreImmediateOffset => "|_Cond__|0_1_0|P|U|B|W|L|__Rn___|__Rd___|________offset_________|",
            LoadStoreRegisterOffset => "|_Cond__|0_1_1|P|U|B|W|L|__Rn___|__Rd___|_shift___|sh_|0|__Rm___|",
            LoadStoreMultiple => "|_Cond__|1_0_0|P|U|S|W|L|__Rn___|___________reg_list____________|",
            Branch => "|_Cond__|1_0_1|L|_____________________offset24______________________|",
            _ => "|_Cond__|",
        };

        let mut raw_bits = String::new();
        for bit in format!("{:032b}", self.raw).chars() {
            raw_bits.push(bit);
            raw_bits.push('_');
        }
        raw_bits.pop();

        write!(f, "INS: {}", self.instruction)?;
        if self.condition != Condition::AL {
            write!(f, " [{}]", self.condition)?;
        }
        writeln!(f)?;
        writeln!(f, "RAW: |{raw_bits}|")?;
        write!(f, "FMT: {layout}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_condition_and_class() {
        let op_code = ArmModeOpcode::try_from(0x0280_0003).unwrap();
        assert_eq!(op_code.condition, Condition::EQ);
        assert_eq!(op_code.instruction, ArmModeInstruction::DataProcessingImmediate);
        assert_eq!(*op_code, 0x0280_0003);
    }

    #[test]
    fn display_shows_layout() {
        let op_code = ArmModeOpcode::try_from(0xEAFF_FFFE).unwrap();
        let text = op_code.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "INS: branch");
        assert!(lines[1].starts_with("RAW: |1_1_1_0_1_0_1_0_1_1"));
        assert_eq!(lines[2], "FMT: |_Cond__|1_0_1|L|_____________________offset24______________________|");
    }
}
