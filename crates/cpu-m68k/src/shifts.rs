//! Shift and rotate instructions (group 0xE).
//!
//! Register variant: 1110 CCC D SS I TT RRR (SS != 11)
//!   CCC = count/register, D = direction (0=right, 1=left)
//!   SS = size (00=byte, 01=word, 10=long)
//!   I = count source (0=immediate 1-8, 1=register modulo 64)
//!   TT = kind (00=AS, 01=LS, 10=ROX, 11=RO)
//!   RRR = data register
//!
//! Memory variant: 1110 0TT D 11 MMMRRR (SS=11)
//!   TT = kind, D = direction, shift by 1, word size, RMW
//!
//! Register timing: 6+2n (byte/word), 8+2n (long) where n = shift count
//! Memory timing: 8+EA

use crate::alu::{self, ShiftKind, Size};
use crate::cpu::Cpu68000;
use crate::decode::{ea_field, reg_field};
use crate::ea::Operand;
use crate::exceptions::Exception;

impl Cpu68000 {
    /// Decode and dispatch group 0xE (shifts/rotates).
    pub(crate) fn exec_shift_rotate(&mut self, op: u16) -> Result<u32, Exception> {
        let left = op & 0x0100 != 0;
        let Some(size) = Size::from_bits(op >> 6) else {
            return self.exec_shift_memory(op, left);
        };

        let kind = ShiftKind::from_bits(op >> 3);
        let reg = usize::from(op & 7);
        let count = if op & 0x0020 != 0 {
            self.regs.d[reg_field(op)] & 63
        } else {
            match reg_field(op) {
                0 => 8,
                n => n as u32,
            }
        };

        let (result, sr) = alu::shift(kind, left, self.regs.d[reg], count, size, self.regs.sr());
        self.write_operand(Operand::DataReg(reg), size, result)?;
        self.regs.set_sr(sr);

        let base = if size == Size::Long { 8 } else { 6 };
        Ok(base + 2 * count)
    }

    fn exec_shift_memory(&mut self, op: u16, left: bool) -> Result<u32, Exception> {
        let mode = ea_field(op)?;
        if op & 0x0800 != 0 || !mode.is_memory_alterable() {
            return Err(Exception::Illegal);
        }

        let kind = ShiftKind::from_bits(op >> 9);
        let target = self.resolve(mode, Size::Word)?;
        let value = self.read_operand(target, Size::Word)?;
        let (result, sr) = alu::shift(kind, left, value, 1, Size::Word, self.regs.sr());
        self.write_operand(target, Size::Word, result)?;
        self.regs.set_sr(sr);
        Ok(8 + crate::timing::ea(mode, Size::Word))
    }
}
