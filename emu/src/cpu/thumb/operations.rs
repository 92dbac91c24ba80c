use crate::bitwise::Bits;
use crate::cpu::CpuError;
use crate::cpu::arm::alu_instruction::{
    add_inner_op, add_with_carry_inner_op, shift_by_immediate, shift_by_register, sub_inner_op,
    sub_with_carry_inner_op,
};
use crate::cpu::arm7tdmi::Arm7tdmi;
use crate::cpu::condition::Condition;
use crate::cpu::flags::{LoadStoreKind, ReadWriteKind, ShiftKind};
use crate::cpu::registers::{REG_LR, REG_PROGRAM_COUNTER, REG_SP};
use crate::cpu::thumb::alu_instructions::{ThumbHighRegisterOperation, ThumbModeAluInstruction};
use crate::cpu::thumb::instruction::ThumbModeInstruction;
use crate::cpu::thumb::mode::ThumbModeOpcode;

/// Rd in bits 2-0 and the other low register in bits 5-3.
fn low_registers(op_code: ThumbModeOpcode) -> (usize, usize) {
    (
        usize::from(op_code.get_bits(0..=2)),
        usize::from(op_code.get_bits(3..=5)),
    )
}

impl Arm7tdmi {
    pub fn execute_thumb(&mut self, op_code: ThumbModeOpcode) -> Result<(), CpuError> {
        use ThumbModeInstruction::*;

        match op_code.instruction {
            ShiftByImmediate => self.shift_by_immediate(op_code),
            AddSubtractRegister | AddSubtractImmediate => self.add_subtract(op_code),
            AddSubtractCompareMoveImmediate => self.move_compare_add_sub_imm(op_code),
            DataProcessingRegister => self.alu_op(op_code),
            SpecialDataProcessing => self.hi_register_op(op_code),
            BranchExchange => self.thumb_branch_and_exchange(op_code),
            LoadPcRelative => self.pc_relative_load(op_code),
            LoadStoreWordByteImmediate => self.load_store_immediate_offset(op_code),
            LoadStoreStack => self.sp_relative_load_store(op_code),
            AddToSpOrPc => self.load_address(op_code),
            Miscellaneous => self.thumb_miscellaneous(op_code),
            LoadStoreMultiple => self.multiple_load_store(op_code),
            ConditionalBranch => self.cond_branch(op_code),
            UnconditionalBranch => self.uncond_branch(op_code),
            BlPrefix => self.long_branch_link(op_code),
            LoadStoreRegisterOffset
            | LoadStoreHalfwordImmediate
            | Undefined
            | SoftwareInterrupt
            | BlxSuffix
            | BlSuffix => Err(self.unimplemented((*op_code).into(), op_code.instruction.name())),
        }
    }

    /// LSL/LSR/ASR Rd, Rs, #offset5
    fn shift_by_immediate(&mut self, op_code: ThumbModeOpcode) -> Result<(), CpuError> {
        let (rd, rs) = low_registers(op_code);
        let kind = ShiftKind::from(u32::from(op_code.get_bits(11..=12)));
        let amount = u32::from(op_code.get_bits(6..=10));

        let shifted = shift_by_immediate(
            kind,
            amount,
            self.registers.register_at(rs),
            self.registers.carry_flag(),
        );
        self.registers.set_register_at(rd, shifted.result);
        self.registers.set_logical_flags(shifted.result, shifted.carry);

        Ok(())
    }

    /// ADD/SUB Rd, Rs, Rn and ADD/SUB Rd, Rs, #offset3
    fn add_subtract(&mut self, op_code: ThumbModeOpcode) -> Result<(), CpuError> {
        let (rd, rs) = low_registers(op_code);
        let rn_offset3 = op_code.get_bits(6..=8);

        let first_op = self.registers.register_at(rs);
        let second_op = if op_code.get_bit(10) {
            u32::from(rn_offset3)
        } else {
            self.registers.register_at(usize::from(rn_offset3))
        };

        let op_result = if op_code.get_bit(9) {
            sub_inner_op(first_op, second_op)
        } else {
            add_inner_op(first_op, second_op)
        };

        self.registers.set_register_at(rd, op_result.result);
        self.registers.set_flags(&op_result);
        Ok(())
    }

    /// MOV/CMP/ADD/SUB Rd, #offset8
    fn move_compare_add_sub_imm(&mut self, op_code: ThumbModeOpcode) -> Result<(), CpuError> {
        let rd = usize::from(op_code.get_bits(8..=10));
        let offset = u32::from(op_code.get_bits(0..=7));
        let rd_value = self.registers.register_at(rd);

        match op_code.get_bits(11..=12) {
            0 => {
                self.registers.set_register_at(rd, offset);
                self.registers
                    .set_logical_flags(offset, self.registers.carry_flag());
            }
            1 => self.registers.set_flags(&sub_inner_op(rd_value, offset)),
            2 => {
                let op_result = add_inner_op(rd_value, offset);
                self.registers.set_register_at(rd, op_result.result);
                self.registers.set_flags(&op_result);
            }
            _ => {
                let op_result = sub_inner_op(rd_value, offset);
                self.registers.set_register_at(rd, op_result.result);
                self.registers.set_flags(&op_result);
            }
        }

        Ok(())
    }

    /// `<op> Rd, Rm` on low registers. Logical operations and shifts leave V
    /// alone; MUL is not supported.
    fn alu_op(&mut self, op_code: ThumbModeOpcode) -> Result<(), CpuError> {
        use ThumbModeAluInstruction::*;

        let operation = ThumbModeAluInstruction::from(op_code.get_bits(6..=9));
        let (rd, rm) = low_registers(op_code);
        let rd_value = self.registers.register_at(rd);
        let rm_value = self.registers.register_at(rm);
        let carry = self.registers.carry_flag();

        if operation == Mul {
            return Err(self.unimplemented((*op_code).into(), "multiply"));
        }

        if let Some(kind) = operation.register_shift() {
            let shifted = shift_by_register(kind, rm_value & 0xFF, rd_value, carry);
            self.registers.set_register_at(rd, shifted.result);
            self.registers.set_logical_flags(shifted.result, shifted.carry);
            return Ok(());
        }

        let logical = match operation {
            And | Tst => Some(rd_value & rm_value),
            Eor => Some(rd_value ^ rm_value),
            Orr => Some(rd_value | rm_value),
            Bic => Some(rd_value & !rm_value),
            Mvn => Some(!rm_value),
            _ => None,
        };

        if let Some(result) = logical {
            self.registers.set_logical_flags(result, carry);
            if operation != Tst {
                self.registers.set_register_at(rd, result);
            }
            return Ok(());
        }

        let op_result = match operation {
            Adc => add_with_carry_inner_op(rd_value, rm_value, carry),
            Sbc => sub_with_carry_inner_op(rd_value, rm_value, carry),
            Neg => sub_inner_op(0, rm_value),
            Cmp => sub_inner_op(rd_value, rm_value),
            _ => add_inner_op(rd_value, rm_value),
        };

        self.registers.set_flags(&op_result);
        if !matches!(operation, Cmp | Cmn) {
            self.registers.set_register_at(rd, op_result.result);
        }

        Ok(())
    }

    /// ADD/CMP/MOV with at least one register in R8-R15. Only CMP sets flags.
    fn hi_register_op(&mut self, op_code: ThumbModeOpcode) -> Result<(), CpuError> {
        let rd = usize::from(op_code.get_bits(0..=2) | (op_code.get_bits(7..=7) << 3));
        let rm = usize::from(op_code.get_bits(3..=6));
        let rd_value = self.registers.register_at(rd);
        let rm_value = self.registers.register_at(rm);

        let result = match ThumbHighRegisterOperation::from(op_code.get_bits(8..=9)) {
            ThumbHighRegisterOperation::Add => rd_value.wrapping_add(rm_value),
            ThumbHighRegisterOperation::Mov => rm_value,
            ThumbHighRegisterOperation::Cmp => {
                self.registers.set_flags(&sub_inner_op(rd_value, rm_value));
                return Ok(());
            }
            ThumbHighRegisterOperation::BxOrBlx => {
                return Err(self.unimplemented((*op_code).into(), "hi register operation"));
            }
        };

        if rd == REG_PROGRAM_COUNTER {
            self.redirect_pc(result & !1);
        } else {
            self.registers.set_register_at(rd, result);
        }

        Ok(())
    }

    /// BX Rm. BLX (H1 set) is not supported.
    fn thumb_branch_and_exchange(&mut self, op_code: ThumbModeOpcode) -> Result<(), CpuError> {
        if op_code.get_bit(7) {
            return Err(self.unimplemented((*op_code).into(), "branch with link and exchange"));
        }

        let target = self.registers.register_at(usize::from(op_code.get_bits(3..=6)));
        self.exchange_to(target);
        Ok(())
    }

    /// LDR Rd, [PC, #word8]. The PC operand is word aligned first.
    fn pc_relative_load(&mut self, op_code: ThumbModeOpcode) -> Result<(), CpuError> {
        let rd = usize::from(op_code.get_bits(8..=10));
        let offset = u32::from(op_code.get_bits(0..=7)) << 2;
        let address = (self.registers.register_at(REG_PROGRAM_COUNTER) & !0b11).wrapping_add(offset);

        let value = self.memory.read_word(address)?;
        self.registers.set_register_at(rd, value);
        Ok(())
    }

    /// LDR/STR/LDRB/STRB Rd, [Rb, #offset5]. Word offsets are scaled by 4.
    fn load_store_immediate_offset(&mut self, op_code: ThumbModeOpcode) -> Result<(), CpuError> {
        let (rd, rb) = low_registers(op_code);
        let quantity = ReadWriteKind::from(op_code.get_bit(12));
        let offset = u32::from(op_code.get_bits(6..=10));
        let offset = match quantity {
            ReadWriteKind::Word => offset << 2,
            ReadWriteKind::Byte => offset,
        };
        let address = self.registers.register_at(rb).wrapping_add(offset);

        self.transfer_single(LoadStoreKind::from(op_code.get_bit(11)), quantity, rd, address)
    }

    /// LDR/STR Rd, [SP, #word8]
    fn sp_relative_load_store(&mut self, op_code: ThumbModeOpcode) -> Result<(), CpuError> {
        let rd = usize::from(op_code.get_bits(8..=10));
        let offset = u32::from(op_code.get_bits(0..=7)) << 2;
        let address = self.registers.stack_pointer().wrapping_add(offset);

        self.transfer_single(
            LoadStoreKind::from(op_code.get_bit(11)),
            ReadWriteKind::Word,
            rd,
            address,
        )
    }

    fn transfer_single(
        &mut self,
        kind: LoadStoreKind,
        quantity: ReadWriteKind,
        rd: usize,
        address: u32,
    ) -> Result<(), CpuError> {
        match (kind, quantity) {
            (LoadStoreKind::Load, ReadWriteKind::Word) => {
                let value = self.memory.read_word(address)?;
                self.registers.set_register_at(rd, value);
            }
            (LoadStoreKind::Load, ReadWriteKind::Byte) => {
                let value = self.memory.read_at(address)?;
                self.registers.set_register_at(rd, value.into());
            }
            (LoadStoreKind::Store, ReadWriteKind::Word) => {
                let value = self.registers.register_at(rd);
                self.memory.write_word(address, value)?;
            }
            (LoadStoreKind::Store, ReadWriteKind::Byte) => {
                let value = self.registers.register_at(rd);
                self.memory.write_at(address, value.get_byte(0))?;
            }
        }

        Ok(())
    }

    /// ADD Rd, PC/SP, #word8
    fn load_address(&mut self, op_code: ThumbModeOpcode) -> Result<(), CpuError> {
        let rd = usize::from(op_code.get_bits(8..=10));
        let offset = u32::from(op_code.get_bits(0..=7)) << 2;
        let base = if op_code.get_bit(11) {
            self.registers.stack_pointer()
        } else {
            self.registers.register_at(REG_PROGRAM_COUNTER) & !0b11
        };

        self.registers.set_register_at(rd, base.wrapping_add(offset));
        Ok(())
    }

    /// Bits 11-8 pick the operation inside `1011xxxx`:
    ///
    /// ```text
    ///   0000      ADD/SUB SP, #word7
    ///   0100/0101 PUSH {Rlist} / PUSH {Rlist, LR}
    ///   1100/1101 POP {Rlist} / POP {Rlist, PC}
    /// ```
    fn thumb_miscellaneous(&mut self, op_code: ThumbModeOpcode) -> Result<(), CpuError> {
        match op_code.get_bits(8..=11) {
            0b0000 => {
                let offset = u32::from(op_code.get_bits(0..=6)) << 2;
                let sp = self.registers.stack_pointer();
                let sp = if op_code.get_bit(7) {
                    sp.wrapping_sub(offset)
                } else {
                    sp.wrapping_add(offset)
                };
                self.registers.set_stack_pointer(sp);
                Ok(())
            }
            0b0100 | 0b0101 => {
                let list = op_code.get_bits(0..=7) | (op_code.get_bits(8..=8) << REG_LR);
                let count = list.count_ones();
                let sp = self.registers.stack_pointer().wrapping_sub(4 * count);
                self.registers.set_stack_pointer(sp);
                self.load_store_multiple_increment_after(REG_SP, list, LoadStoreKind::Store, false)
            }
            0b1100 | 0b1101 => {
                let list = op_code.get_bits(0..=7) | (op_code.get_bits(8..=8) << REG_PROGRAM_COUNTER);
                self.load_store_multiple_increment_after(REG_SP, list, LoadStoreKind::Load, true)
            }
            _ => Err(self.unimplemented((*op_code).into(), "miscellaneous")),
        }
    }

    /// LDMIA/STMIA Rb!, {Rlist}
    fn multiple_load_store(&mut self, op_code: ThumbModeOpcode) -> Result<(), CpuError> {
        self.load_store_multiple_increment_after(
            usize::from(op_code.get_bits(8..=10)),
            op_code.get_bits(0..=7),
            LoadStoreKind::from(op_code.get_bit(11)),
            true,
        )
    }

    /// B<cond> label, with a 9-bit signed offset in half-words.
    fn cond_branch(&mut self, op_code: ThumbModeOpcode) -> Result<(), CpuError> {
        let condition = Condition::from(u32::from(op_code.get_bits(8..=11)));
        if !self.condition_passed(condition)? {
            return Ok(());
        }

        let offset = (u32::from(op_code.get_bits(0..=7)) << 1).sign_extended(9);
        let pc = self.registers.register_at(REG_PROGRAM_COUNTER);
        self.redirect_pc(pc.wrapping_add(offset));
        Ok(())
    }

    /// B label, with a 12-bit signed offset in half-words.
    fn uncond_branch(&mut self, op_code: ThumbModeOpcode) -> Result<(), CpuError> {
        let offset = (u32::from(op_code.get_bits(0..=10)) << 1).sign_extended(12);
        let pc = self.registers.register_at(REG_PROGRAM_COUNTER);
        self.redirect_pc(pc.wrapping_add(offset));
        Ok(())
    }

    /// BL label, as a prefix/suffix pair executed in one step.
    ///
    /// ```text
    ///   1111 0 offset_hi   offset = sign_extend(offset_hi << 12)
    ///   1111 1 offset_lo          + (offset_lo << 1)
    /// ```
    ///
    /// The target is relative to the prefix address + 4. LR gets the address
    /// after the pair with bit 0 set, so that returning with BX stays in Thumb.
    fn long_branch_link(&mut self, op_code: ThumbModeOpcode) -> Result<(), CpuError> {
        let pc = self.registers.program_counter();
        let suffix = self.memory.read_half_word(pc.wrapping_add(2))?;
        if suffix.get_bits(11..=15) != 0b11111 {
            return Err(self.unimplemented((*op_code).into(), "BL prefix without BL suffix"));
        }

        let offset = (u32::from(op_code.get_bits(0..=10)) << 12)
            .sign_extended(23)
            .wrapping_add(u32::from(suffix.get_bits(0..=10)) << 1);
        let next = pc.wrapping_add(4);

        self.registers.set_link_register(next | 1);
        self.redirect_pc(next.wrapping_add(offset));
        Ok(())
    }
}
