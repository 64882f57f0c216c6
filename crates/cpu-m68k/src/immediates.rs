//! Group 0: immediate ALU operations, bit operations and MOVEP.
//!
//! ```text
//! 0000 000 0 SS MMMRRR  ORI      0000 101 0 SS MMMRRR  EORI
//! 0000 001 0 SS MMMRRR  ANDI     0000 110 0 SS MMMRRR  CMPI
//! 0000 010 0 SS MMMRRR  SUBI     0000 100 0 TT MMMRRR  Bxxx #n,<ea>
//! 0000 011 0 SS MMMRRR  ADDI     0000 DDD 1 TT MMMRRR  Bxxx Dn,<ea>
//! 0000 DDD 1 OO 001AAA  MOVEP
//! ```
//!
//! ORI/ANDI/EORI with EA `#imm` (mode 7, reg 4) target CCR (byte size) or
//! SR (word size, privileged).

use crate::addressing::AddrMode;
use crate::alu::{self, Size};
use crate::cpu::Cpu68000;
use crate::decode::{ea_field, reg_field, size_field};
use crate::exceptions::Exception;
use crate::flags::{Status, CCR_MASK, Z};
use crate::timing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImmOp {
    Or,
    And,
    Sub,
    Add,
    Eor,
    Cmp,
}

impl Cpu68000 {
    pub(crate) fn exec_group0(&mut self, op: u16) -> Result<u32, Exception> {
        match op {
            0x003C => return self.exec_immediate_sr(ImmOp::Or, false),
            0x007C => return self.exec_immediate_sr(ImmOp::Or, true),
            0x023C => return self.exec_immediate_sr(ImmOp::And, false),
            0x027C => return self.exec_immediate_sr(ImmOp::And, true),
            0x0A3C => return self.exec_immediate_sr(ImmOp::Eor, false),
            0x0A7C => return self.exec_immediate_sr(ImmOp::Eor, true),
            _ => {}
        }

        if op & 0x0100 != 0 {
            if op & 0x0038 == 0x0008 {
                return self.exec_movep(op);
            }
            let bit = self.regs.d[reg_field(op)];
            return self.exec_bit(op, bit, false);
        }

        match (op >> 9) & 7 {
            0 => self.exec_immediate(op, ImmOp::Or),
            1 => self.exec_immediate(op, ImmOp::And),
            2 => self.exec_immediate(op, ImmOp::Sub),
            3 => self.exec_immediate(op, ImmOp::Add),
            4 => {
                let mode = ea_field(op)?;
                if op & 0x00C0 == 0 && mode == AddrMode::Immediate {
                    return Err(Exception::Illegal);
                }
                let bit = u32::from(self.fetch_word()? & 0xFF);
                self.exec_bit(op, bit, true)
            }
            5 => self.exec_immediate(op, ImmOp::Eor),
            6 => self.exec_immediate(op, ImmOp::Cmp),
            _ => Err(Exception::Illegal),
        }
    }

    fn exec_immediate(&mut self, op: u16, kind: ImmOp) -> Result<u32, Exception> {
        let size = size_field(op)?;
        let mode = ea_field(op)?;
        if !mode.is_data_alterable() {
            return Err(Exception::Illegal);
        }

        let imm = match size {
            Size::Byte => u32::from(self.fetch_word()? & 0xFF),
            Size::Word => u32::from(self.fetch_word()?),
            Size::Long => self.fetch_long()?,
        };
        let target = self.resolve(mode, size)?;
        let dst = self.read_operand(target, size)?;

        let sr = self.regs.sr();
        let (result, sr) = match kind {
            ImmOp::Or => logical(dst | imm, size, sr),
            ImmOp::And => logical(dst & imm, size, sr),
            ImmOp::Eor => logical(dst ^ imm, size, sr),
            ImmOp::Sub => alu::sub(imm, dst, size, sr),
            ImmOp::Add => alu::add(imm, dst, size, sr),
            ImmOp::Cmp => (dst, alu::compare(imm, dst, size, sr).1),
        };
        if kind != ImmOp::Cmp {
            self.write_operand(target, size, result)?;
        }
        self.regs.set_sr(sr);

        let long = size == Size::Long;
        Ok(match (mode, kind) {
            (AddrMode::DataReg(_), ImmOp::Cmp) => if long { 14 } else { 8 },
            (AddrMode::DataReg(_), _) => if long { 16 } else { 8 },
            (_, ImmOp::Cmp) => (if long { 12 } else { 8 }) + timing::ea(mode, size),
            _ => (if long { 20 } else { 12 }) + timing::ea(mode, size),
        })
    }

    /// ORI/ANDI/EORI to CCR or SR.
    fn exec_immediate_sr(&mut self, kind: ImmOp, to_sr: bool) -> Result<u32, Exception> {
        if to_sr {
            self.require_supervisor()?;
        }
        let imm = self.fetch_word()?;
        let mask = if to_sr { 0xFFFF } else { CCR_MASK };
        let current = self.regs.sr() & mask;
        let value = match kind {
            ImmOp::Or => current | imm,
            ImmOp::And => current & imm,
            _ => current ^ imm,
        };
        if to_sr {
            self.regs.set_sr(value);
        } else {
            self.regs.set_ccr(value as u8);
        }
        Ok(20)
    }

    /// BTST/BCHG/BCLR/BSET. Bit numbers are taken modulo 32 for Dn and
    /// modulo 8 for memory (which is accessed as a byte).
    fn exec_bit(&mut self, op: u16, bit: u32, immediate: bool) -> Result<u32, Exception> {
        let mode = ea_field(op)?;
        let kind = (op >> 6) & 3;
        let valid = if kind == 0 { mode.is_data() } else { mode.is_data_alterable() };
        if !valid {
            return Err(Exception::Illegal);
        }

        let register = matches!(mode, AddrMode::DataReg(_));
        let (size, mask) = if register {
            (Size::Long, 1u32 << (bit & 31))
        } else {
            (Size::Byte, 1u32 << (bit & 7))
        };
        let target = self.resolve(mode, size)?;
        let value = self.read_operand(target, size)?;
        self.regs.set_sr(Status::set_if(self.regs.sr(), Z, value & mask == 0));

        let result = match kind {
            1 => value ^ mask,
            2 => value & !mask,
            3 => value | mask,
            _ => value,
        };
        if kind != 0 {
            self.write_operand(target, size, result)?;
        }

        let extra = if immediate { 4 } else { 0 };
        Ok(if register {
            extra + match kind {
                0 => 6,
                2 => 10,
                _ => 8,
            }
        } else {
            extra + (if kind == 0 { 4 } else { 8 }) + timing::ea(mode, Size::Byte)
        })
    }

    /// MOVEP: alternate-byte transfer between Dn and d16(An).
    fn exec_movep(&mut self, op: u16) -> Result<u32, Exception> {
        let dn = reg_field(op);
        let an = usize::from(op & 7);
        let disp = self.fetch_word()? as i16;
        let address = self.regs.a[an].wrapping_add_signed(i32::from(disp));
        let long = op & 0x0040 != 0;
        let count: u32 = if long { 4 } else { 2 };

        if op & 0x0080 != 0 {
            let value = self.regs.d[dn];
            for i in 0..count {
                let byte = value >> (8 * (count - 1 - i));
                self.write_data(address.wrapping_add(2 * i), Size::Byte, byte)?;
            }
        } else {
            let mut value = 0u32;
            for i in 0..count {
                value = (value << 8) | self.read_data(address.wrapping_add(2 * i), Size::Byte)?;
            }
            if long {
                self.regs.d[dn] = value;
            } else {
                self.regs.set_d_word(dn, value as u16);
            }
        }
        Ok(if long { 24 } else { 16 })
    }
}

fn logical(value: u32, size: Size, sr: u16) -> (u32, u16) {
    let value = size.mask(value);
    (value, Status::logical(sr, value, size))
}
