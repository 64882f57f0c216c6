//! Logic instructions: OR (group 0x8) and AND (group 0xC), together with
//! the multiply, divide, BCD and EXG forms that share their lines.
//!
//! Both follow the same pattern as ADD/SUB:
//! - Opmodes 0-2: EA → Dn (byte/word/long)
//! - Opmode 3: DIVU (0x8) / MULU (0xC)
//! - Opmodes 4-6: Dn → EA (read-modify-write, memory only)
//! - Opmode 7: DIVS (0x8) / MULS (0xC)
//!
//! With a register EA in opmodes 4-6, line 0x8 holds SBCD and line 0xC
//! holds ABCD and EXG.

use crate::addressing::AddrMode;
use crate::alu::{self, Size};
use crate::cpu::Cpu68000;
use crate::decode::{ea_field, reg_field, size_field};
use crate::ea::Operand;
use crate::exceptions::{vector, Exception};
use crate::flags::{Status, C, N, V, Z};
use crate::timing;

#[derive(Debug, Clone, Copy)]
enum LogicKind {
    Or,
    And,
}

impl LogicKind {
    const fn apply(self, a: u32, b: u32) -> u32 {
        match self {
            Self::Or => a | b,
            Self::And => a & b,
        }
    }
}

impl Cpu68000 {
    /// Line 0x8: OR, DIVU, DIVS, SBCD.
    pub(crate) fn exec_or(&mut self, op: u16) -> Result<u32, Exception> {
        match (op >> 6) & 7 {
            3 => self.exec_divu(op),
            7 => self.exec_divs(op),
            4 if op & 0x0030 == 0 => self.exec_bcd(op, alu::sbcd),
            _ => self.exec_logic(op, LogicKind::Or),
        }
    }

    /// Line 0xC: AND, MULU, MULS, ABCD, EXG.
    pub(crate) fn exec_and(&mut self, op: u16) -> Result<u32, Exception> {
        match ((op >> 6) & 7, (op >> 3) & 7) {
            (3, _) => self.exec_mulu(op),
            (7, _) => self.exec_muls(op),
            (4, 0 | 1) => self.exec_bcd(op, alu::abcd),
            (5, 0 | 1) | (6, 1) => Ok(self.exec_exg(op)),
            (6, 0) => Err(Exception::Illegal),
            _ => self.exec_logic(op, LogicKind::And),
        }
    }

    /// OR/AND in either direction.
    ///
    /// Timing: `<ea>,Dn` 4+ea (6+ea long, 8+ea for Dn/#imm long);
    /// `Dn,<ea>` 8+ea (12+ea long).
    fn exec_logic(&mut self, op: u16, kind: LogicKind) -> Result<u32, Exception> {
        let size = size_field(op)?;
        let reg = reg_field(op);
        let mode = ea_field(op)?;

        if op & 0x0100 == 0 {
            if !mode.is_data() {
                return Err(Exception::Illegal);
            }
            let src = self.read_ea(mode, size)?;
            let value = size.mask(kind.apply(src, self.regs.d[reg]));
            self.write_operand(Operand::DataReg(reg), size, value)?;
            self.regs.set_sr(Status::logical(self.regs.sr(), value, size));
            return Ok(match size {
                Size::Long if mode.is_register_or_immediate() => 8 + timing::ea(mode, size),
                Size::Long => 6 + timing::ea(mode, size),
                _ => 4 + timing::ea(mode, size),
            });
        }

        if !mode.is_memory_alterable() {
            return Err(Exception::Illegal);
        }
        let target = self.resolve(mode, size)?;
        let dst = self.read_operand(target, size)?;
        let value = size.mask(kind.apply(dst, self.regs.d[reg]));
        self.write_operand(target, size, value)?;
        self.regs.set_sr(Status::logical(self.regs.sr(), value, size));
        Ok((if size == Size::Long { 12 } else { 8 }) + timing::ea(mode, size))
    }

    /// ABCD/SBCD Dy,Dx (6 cycles) and -(Ay),-(Ax) (18 cycles).
    fn exec_bcd(&mut self, op: u16, operation: fn(u8, u8, u16) -> (u8, u16)) -> Result<u32, Exception> {
        let rx = reg_field(op);
        let ry = usize::from(op & 7);

        if op & 0x0008 == 0 {
            let (result, sr) = operation(self.regs.d_byte(ry), self.regs.d_byte(rx), self.regs.sr());
            self.regs.set_d_byte(rx, result);
            self.regs.set_sr(sr);
            return Ok(6);
        }

        let src = self.read_ea(AddrMode::AddrIndPreDec(ry as u8), Size::Byte)?;
        let target = self.resolve(AddrMode::AddrIndPreDec(rx as u8), Size::Byte)?;
        let dst = self.read_operand(target, Size::Byte)?;
        let (result, sr) = operation(src as u8, dst as u8, self.regs.sr());
        self.write_operand(target, Size::Byte, u32::from(result))?;
        self.regs.set_sr(sr);
        Ok(18)
    }

    /// EXG: 6 cycles.
    fn exec_exg(&mut self, op: u16) -> u32 {
        let rx = reg_field(op);
        let ry = usize::from(op & 7);
        match (op >> 3) & 0x1F {
            0x08 => self.regs.d.swap(rx, ry),
            0x09 => self.regs.a.swap(rx, ry),
            _ => std::mem::swap(&mut self.regs.d[rx], &mut self.regs.a[ry]),
        }
        6
    }

    /// Word source operand for MUL/DIV; must be a data mode.
    fn word_source(&mut self, op: u16) -> Result<(AddrMode, u16), Exception> {
        let mode = ea_field(op)?;
        if !mode.is_data() {
            return Err(Exception::Illegal);
        }
        Ok((mode, self.read_ea(mode, Size::Word)? as u16))
    }

    fn set_product_flags(&mut self, product: u32) {
        let sr = self.regs.sr() & !(N | Z | V | C);
        self.regs.set_sr(Status::nz(sr, product, Size::Long));
    }

    fn exec_mulu(&mut self, op: u16) -> Result<u32, Exception> {
        let reg = reg_field(op);
        let (mode, src) = self.word_source(op)?;
        let product = u32::from(self.regs.d_word(reg)) * u32::from(src);
        self.regs.d[reg] = product;
        self.set_product_flags(product);
        Ok(timing::mulu(src) + timing::ea(mode, Size::Word))
    }

    fn exec_muls(&mut self, op: u16) -> Result<u32, Exception> {
        let reg = reg_field(op);
        let (mode, src) = self.word_source(op)?;
        let product = i32::from(self.regs.d_word(reg) as i16) * i32::from(src as i16);
        self.regs.d[reg] = product as u32;
        self.set_product_flags(product as u32);
        Ok(timing::muls(src) + timing::ea(mode, Size::Word))
    }

    /// Divide by zero traps through vector 5 at 38 + ea cycles, with the
    /// return address pointing past the instruction.
    fn divide_by_zero(&mut self, mode: AddrMode) -> Exception {
        self.regs.set_sr(self.regs.sr() & !C);
        Exception::Trap {
            vector: vector::ZERO_DIVIDE,
            cycles: timing::ZERO_DIVIDE + timing::ea(mode, Size::Word),
        }
    }

    /// Overflow sets V and leaves Dn untouched.
    fn set_divide_overflow(&mut self) {
        let sr = self.regs.sr() & !C;
        self.regs.set_sr(sr | V);
    }

    fn set_quotient(&mut self, reg: usize, quotient: u16, remainder: u16) {
        self.regs.d[reg] = (u32::from(remainder) << 16) | u32::from(quotient);
        let sr = self.regs.sr() & !(N | Z | V | C);
        self.regs.set_sr(Status::nz(sr, u32::from(quotient), Size::Word));
    }

    fn exec_divu(&mut self, op: u16) -> Result<u32, Exception> {
        let reg = reg_field(op);
        let (mode, divisor) = self.word_source(op)?;
        if divisor == 0 {
            return Err(self.divide_by_zero(mode));
        }

        let dividend = self.regs.d[reg];
        let quotient = dividend / u32::from(divisor);
        if quotient > 0xFFFF {
            self.set_divide_overflow();
        } else {
            let remainder = dividend % u32::from(divisor);
            self.set_quotient(reg, quotient as u16, remainder as u16);
        }
        Ok(timing::divu(dividend, divisor) + timing::ea(mode, Size::Word))
    }

    fn exec_divs(&mut self, op: u16) -> Result<u32, Exception> {
        let reg = reg_field(op);
        let (mode, divisor) = self.word_source(op)?;
        if divisor == 0 {
            return Err(self.divide_by_zero(mode));
        }

        let dividend = self.regs.d[reg] as i32;
        let divisor = divisor as i16;
        let quotient = i64::from(dividend) / i64::from(divisor);
        if i16::try_from(quotient).is_err() {
            self.set_divide_overflow();
        } else {
            let remainder = i64::from(dividend) % i64::from(divisor);
            self.set_quotient(reg, quotient as u16, remainder as u16);
        }
        Ok(timing::divs(dividend, divisor) + timing::ea(mode, Size::Word))
    }
}

#[cfg(test)]
mod tests {
    use super::LogicKind;

    #[test]
    fn logic_kinds() {
        assert_eq!(LogicKind::Or.apply(0xF0, 0x0F), 0xFF);
        assert_eq!(LogicKind::And.apply(0xF0, 0x3C), 0x30);
    }
}
