//! Data movement: MOVE, MOVEA, MOVEQ and LEA.

use crate::addressing::AddrMode;
use crate::alu::Size;
use crate::cpu::Cpu68000;
use crate::decode::{ea_field, reg_field};
use crate::exceptions::Exception;
use crate::flags::Status;
use crate::timing;

impl Cpu68000 {
    /// MOVE/MOVEA: 00SS RRR MMM mmm rrr
    pub(crate) fn exec_move(&mut self, op: u16) -> Result<u32, Exception> {
        let size = Size::from_move_bits(op >> 12).ok_or(Exception::Illegal)?;
        let src = ea_field(op)?;
        let dst = AddrMode::decode(((op >> 6) & 7) as u8, ((op >> 9) & 7) as u8)
            .ok_or(Exception::Illegal)?;

        if size == Size::Byte && matches!(src, AddrMode::AddrReg(_)) {
            return Err(Exception::Illegal);
        }

        if let AddrMode::AddrReg(r) = dst {
            // MOVEA: word sources are sign-extended, flags untouched.
            if size == Size::Byte {
                return Err(Exception::Illegal);
            }
            let value = self.read_ea(src, size)?;
            self.regs.a[usize::from(r)] = size.sign_extend(value);
            return Ok(4 + timing::ea(src, size));
        }

        if !dst.is_data_alterable() {
            return Err(Exception::Illegal);
        }
        let value = self.read_ea(src, size)?;
        let target = self.resolve(dst, size)?;
        self.write_operand(target, size, value)?;
        self.regs.set_sr(Status::logical(self.regs.sr(), value, size));
        Ok(4 + timing::ea(src, size) + timing::move_destination(dst, size))
    }

    /// MOVEQ: 0111 RRR 0 DDDDDDDD
    pub(crate) fn exec_moveq(&mut self, op: u16) -> u32 {
        let value = Size::Byte.sign_extend(u32::from(op));
        self.regs.d[reg_field(op)] = value;
        self.regs.set_sr(Status::logical(self.regs.sr(), value, Size::Long));
        4
    }

    /// LEA: 0100 RRR 111 MMMRRR
    pub(crate) fn exec_lea(&mut self, op: u16) -> Result<u32, Exception> {
        let mode = ea_field(op)?;
        let address = self.control_address(mode)?;
        self.regs.a[reg_field(op)] = address;
        Ok(timing::lea(mode))
    }
}
