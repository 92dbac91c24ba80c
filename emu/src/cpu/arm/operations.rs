use crate::bitwise::{Bits, Rotate};
use crate::cpu::CpuError;
use crate::cpu::arm::alu_instruction::{
    ArithmeticOpResult, ArmModeAluInstruction, add_inner_op, shift_by_immediate, shift_by_register,
};
use crate::cpu::arm::instructions::ArmModeInstruction;
use crate::cpu::arm::mode::ArmModeOpcode;
use crate::cpu::arm7tdmi::Arm7tdmi;
use crate::cpu::flags::{Indexing, LoadStoreKind, Offsetting, ReadWriteKind, ShiftKind};
use crate::cpu::psr::{CpuState, PRIVILEGED_MASK, Psr, STATE_MASK, UNALLOCATED_MASK, USER_MASK};
use crate::cpu::registers::REG_PROGRAM_COUNTER;

impl Arm7tdmi {
    pub fn execute_arm(&mut self, op_code: ArmModeOpcode) -> Result<(), CpuError> {
        use ArmModeInstruction::*;

        match op_code.instruction {
            DataProcessingImmediateShift | DataProcessingRegisterShift | DataProcessingImmediate => {
                self.data_processing(op_code)
            }
            Miscellaneous => self.arm_extension(op_code),
            MoveImmediateToStatusRegister => self.move_to_status_register(op_code),
            LoadStoreImmediateOffset | LoadStoreRegisterOffset => self.single_data_transfer(op_code),
            LoadStoreMultiple => self.block_data_transfer(op_code),
            Branch => self.branch(op_code),
            MultiplyOrExtraLoadStore
            | Undefined
            | Media
            | ArchitecturallyUndefined
            | CoprocessorLoadStore
            | CoprocessorDataProcessing
            | CoprocessorRegisterTransfer
            | SoftwareInterrupt => Err(self.unimplemented(*op_code, op_code.instruction.name())),
        }
    }

    /// ADD and MOV. Test and compare opcodes without S belong to the control
    /// and DSP space; every other opcode is unimplemented once the condition
    /// passed.
    fn data_processing(&mut self, op_code: ArmModeOpcode) -> Result<(), CpuError> {
        let alu_instruction = ArmModeAluInstruction::from(op_code.get_bits(21..=24));
        let set_conditions = op_code.get_bit(20);

        if alu_instruction.is_test_or_compare() && !set_conditions {
            return self.arm_extension(op_code);
        }

        if !self.condition_passed(op_code.condition)? {
            return Ok(());
        }

        let rd = op_code.get_bits(12..=15) as usize;
        let rn = op_code.get_bits(16..=19) as usize;
        let (shifter_operand, shifter_carry) = self.shifter_operand(op_code);

        let op_result = match alu_instruction {
            ArmModeAluInstruction::Add => {
                add_inner_op(self.registers.register_at(rn), shifter_operand)
            }
            ArmModeAluInstruction::Mov => ArithmeticOpResult {
                result: shifter_operand,
                carry: shifter_carry,
                overflow: self.registers.overflow_flag(),
                sign: shifter_operand.get_bit(31),
                zero: shifter_operand == 0,
            },
            _ => return Err(self.unimplemented(*op_code, op_code.instruction.name())),
        };

        if rd == REG_PROGRAM_COUNTER {
            // Exception return: the mode (and with it the bank) comes back from SPSR.
            if set_conditions {
                self.registers.restore_cpsr_from_spsr()?;
            }
            self.redirect_pc(op_result.result);
        } else {
            self.registers.set_register_at(rd, op_result.result);
            if set_conditions {
                self.registers.set_flags(&op_result);
            }
        }

        Ok(())
    }

    /// Second ALU operand and the shifter carry-out.
    pub(crate) fn shifter_operand(&self, op_code: ArmModeOpcode) -> (u32, bool) {
        let carry = self.registers.carry_flag();

        if op_code.get_bit(25) {
            let immediate = op_code.get_bits(0..=7);
            let rotate = op_code.get_bits(8..=11) * 2;
            if rotate == 0 {
                return (immediate, carry);
            }

            let operand = immediate.rotate_right_by(rotate);
            return (operand, operand.get_bit(31));
        }

        let rm = self.registers.register_at(op_code.get_bits(0..=3) as usize);
        if op_code.get_bits(4..=11) == 0 {
            return (rm, carry);
        }

        let kind = ShiftKind::from(op_code.get_bits(5..=6));
        let shifted = if op_code.get_bit(4) {
            let rs = self.registers.register_at(op_code.get_bits(8..=11) as usize);
            shift_by_register(kind, rs & 0xFF, rm, carry)
        } else {
            shift_by_immediate(kind, op_code.get_bits(7..=11), rm, carry)
        };

        (shifted.result, shifted.carry)
    }

    /// Control and DSP extension space, selected by bits 7-4.
    fn arm_extension(&mut self, op_code: ArmModeOpcode) -> Result<(), CpuError> {
        let raw = *op_code;

        match op_code.get_bits(4..=7) {
            0 if op_code.get_bit(21) => self.move_to_status_register(op_code),
            0 => self.move_status_register_to_register(op_code),
            1 if !op_code.get_bit(22) => self.branch_and_exchange(op_code),
            1 => Err(self.unimplemented(raw, "count leading zeros")),
            2 => Err(self.unimplemented(raw, "branch and exchange Jazelle")),
            3 => Err(self.unimplemented(raw, "branch with link and exchange")),
            5 => Err(self.unimplemented(raw, "saturating add/subtract")),
            7 => Err(self.unimplemented(raw, "breakpoint")),
            8..=15 => Err(self.unimplemented(raw, "signed multiply")),
            _ => Err(CpuError::DecodeFailure {
                raw,
                pc: self.registers.program_counter(),
                state: CpuState::Arm,
            }),
        }
    }

    /// MRS Rd, CPSR/SPSR
    fn move_status_register_to_register(&mut self, op_code: ArmModeOpcode) -> Result<(), CpuError> {
        if !self.condition_passed(op_code.condition)? {
            return Ok(());
        }

        let rd = op_code.get_bits(12..=15) as usize;
        if rd == REG_PROGRAM_COUNTER {
            return Err(self.violation("MRS with R15 as destination"));
        }

        let psr = if op_code.get_bit(22) {
            self.registers.spsr()?
        } else {
            self.registers.cpsr()
        };
        self.registers.set_register_at(rd, psr.into());

        Ok(())
    }

    /// MSR CPSR/SPSR_<fields>, Rm or #immediate
    ///
    /// Bits 19-16 select which byte lanes are written. In User mode only the
    /// flag byte of the CPSR can change; privileged modes also reach the
    /// control byte, except for the T bit which must stay as it is.
    fn move_to_status_register(&mut self, op_code: ArmModeOpcode) -> Result<(), CpuError> {
        if !self.condition_passed(op_code.condition)? {
            return Ok(());
        }

        let operand = if op_code.get_bit(25) {
            op_code
                .get_bits(0..=7)
                .rotate_right_by(op_code.get_bits(8..=11) * 2)
        } else {
            self.registers.register_at(op_code.get_bits(0..=3) as usize)
        };

        if operand & UNALLOCATED_MASK != 0 {
            return Err(self.violation("MSR operand sets reserved status bits"));
        }

        let field_mask = op_code.get_bits(16..=19);
        let byte_mask = (0..4_u8)
            .filter(|lane| field_mask.get_bit(*lane))
            .fold(0_u32, |mask, lane| mask | (0xFF << (8 * lane)));

        if op_code.get_bit(22) {
            let spsr: u32 = self.registers.spsr()?.into();
            let mask = byte_mask & (USER_MASK | PRIVILEGED_MASK | STATE_MASK);
            self.registers
                .set_spsr(Psr::from((spsr & !mask) | (operand & mask)))?;
            return Ok(());
        }

        let cpsr: u32 = self.registers.cpsr().into();
        let mask = if self.registers.in_privileged_mode() {
            if field_mask.get_bit(0) && (operand ^ cpsr) & STATE_MASK != 0 {
                return Err(self.violation("MSR would change the instruction set state"));
            }
            byte_mask & (USER_MASK | PRIVILEGED_MASK)
        } else {
            byte_mask & USER_MASK
        };

        self.registers
            .set_cpsr(Psr::from((cpsr & !mask) | (operand & mask)))
    }

    /// BX Rm
    fn branch_and_exchange(&mut self, op_code: ArmModeOpcode) -> Result<(), CpuError> {
        if !self.condition_passed(op_code.condition)? {
            return Ok(());
        }

        let target = self.registers.register_at(op_code.get_bits(0..=3) as usize);
        self.exchange_to(target);
        Ok(())
    }

    /// B/BL. The offset and the link are relative to the pipeline PC (+8).
    fn branch(&mut self, op_code: ArmModeOpcode) -> Result<(), CpuError> {
        if !self.condition_passed(op_code.condition)? {
            return Ok(());
        }

        let pc = self.registers.register_at(REG_PROGRAM_COUNTER);
        if op_code.get_bit(24) {
            self.registers.set_link_register(pc);
        }

        let offset = (op_code.get_bits(0..=23) << 2).sign_extended(26);
        self.redirect_pc(pc.wrapping_add(offset));
        Ok(())
    }

    /// LDR, STR, LDRB and STRB.
    fn single_data_transfer(&mut self, op_code: ArmModeOpcode) -> Result<(), CpuError> {
        let condition_passed = self.condition_passed(op_code.condition)?;

        let indexing = Indexing::from(op_code.get_bit(24));
        if condition_passed && indexing == Indexing::Post && op_code.get_bit(21) {
            return Err(self.unimplemented(*op_code, "load/store with user mode translation"));
        }

        let rd = op_code.get_bits(12..=15) as usize;
        let kind = LoadStoreKind::from(op_code.get_bit(20));
        let quantity = ReadWriteKind::from(op_code.get_bit(22));

        if condition_passed
            && kind == LoadStoreKind::Load
            && quantity == ReadWriteKind::Byte
            && rd == REG_PROGRAM_COUNTER
        {
            return Err(self.violation("LDRB with R15 as destination"));
        }

        // Read before the base is written back, for STR Rn, [Rn], #4.
        let value = self.registers.register_at(rd);
        let address = self.arm_load_store_address(op_code, condition_passed)?;

        if !condition_passed {
            return Ok(());
        }

        match (kind, quantity) {
            (LoadStoreKind::Load, ReadWriteKind::Word) => {
                let data = self.memory.read_word(address)?;
                if rd == REG_PROGRAM_COUNTER {
                    self.redirect_pc(data & !0b11);
                } else {
                    self.registers.set_register_at(rd, data);
                }
            }
            (LoadStoreKind::Load, ReadWriteKind::Byte) => {
                let data = self.memory.read_at(address)?;
                self.registers.set_register_at(rd, data.into());
            }
            (LoadStoreKind::Store, ReadWriteKind::Word) => self.memory.write_word(address, value)?,
            (LoadStoreKind::Store, ReadWriteKind::Byte) => {
                self.memory.write_at(address, value.get_byte(0))?;
            }
        }

        Ok(())
    }

    /// Address of a single data transfer. The base is written back only when
    /// the condition passed, the address is returned either way.
    ///
    /// ```text
    ///   I P W
    ///   0 1 0   [Rn, #±imm]
    ///   0 1 1   [Rn, #±imm]!
    ///   0 0 0   [Rn], #±imm
    ///   1 1 x   [Rn, ±Rm, shift #n] (with ! when W)
    ///   1 0 0   [Rn], ±Rm, shift #n
    /// ```
    pub(crate) fn arm_load_store_address(
        &mut self,
        op_code: ArmModeOpcode,
        condition_passed: bool,
    ) -> Result<u32, CpuError> {
        let rn = op_code.get_bits(16..=19) as usize;
        let base = self.registers.register_at(rn);

        let offset = if op_code.get_bit(25) {
            let rm = self.registers.register_at(op_code.get_bits(0..=3) as usize);
            shift_by_immediate(
                ShiftKind::from(op_code.get_bits(5..=6)),
                op_code.get_bits(7..=11),
                rm,
                self.registers.carry_flag(),
            )
            .result
        } else {
            op_code.get_bits(0..=11)
        };

        let offset_address = Offsetting::from(op_code.get_bit(23)).apply(base, offset);

        let (address, new_base) = match (Indexing::from(op_code.get_bit(24)), op_code.get_bit(21)) {
            (Indexing::Pre, false) => (offset_address, None),
            (Indexing::Pre, true) => (offset_address, Some(offset_address)),
            (Indexing::Post, _) => (base, Some(offset_address)),
        };

        if let (true, Some(new_base)) = (condition_passed, new_base) {
            self.write_back(rn, new_base)?;
        }

        Ok(address)
    }

    /// LDM/STM. Only increment-after without the S bit is supported.
    fn block_data_transfer(&mut self, op_code: ArmModeOpcode) -> Result<(), CpuError> {
        if !self.condition_passed(op_code.condition)? {
            return Ok(());
        }

        let increment_after = !op_code.get_bit(24) && op_code.get_bit(23);
        if !increment_after || op_code.get_bit(22) {
            return Err(self.unimplemented(*op_code, "load/store multiple addressing mode"));
        }

        self.load_store_multiple_increment_after(
            op_code.get_bits(16..=19) as usize,
            op_code.get_bits(0..=15) as u16,
            LoadStoreKind::from(op_code.get_bit(20)),
            op_code.get_bit(21),
        )
    }

    /// Transfers the listed registers, lowest first, to consecutive words
    /// starting at the base. A load that includes the base keeps the loaded
    /// value and skips the writeback.
    pub(crate) fn load_store_multiple_increment_after(
        &mut self,
        rn: usize,
        register_list: u16,
        kind: LoadStoreKind,
        write_back: bool,
    ) -> Result<(), CpuError> {
        if register_list == 0 {
            return Err(self.violation("load/store multiple with an empty register list"));
        }

        let mut address = self.registers.register_at(rn);

        for reg in (0..=15_u8).filter(|reg| register_list.get_bit(*reg)) {
            let reg = usize::from(reg);
            match kind {
                LoadStoreKind::Load => {
                    let value = self.memory.read_word(address & !0b11)?;
                    if reg == REG_PROGRAM_COUNTER {
                        let alignment = match self.registers.cpu_state() {
                            CpuState::Arm => !0b11,
                            CpuState::Thumb => !0b1,
                        };
                        self.redirect_pc(value & alignment);
                    } else {
                        self.registers.set_register_at(reg, value);
                    }
                }
                LoadStoreKind::Store => {
                    let value = self.registers.register_at(reg);
                    self.memory.write_word(address, value)?;
                }
            }

            address = address.wrapping_add(4);
        }

        let base_loaded = kind == LoadStoreKind::Load && register_list.get_bit(rn as u8);
        if write_back && !base_loaded {
            self.write_back(rn, address)?;
        }

        Ok(())
    }
}
