//! Branch instructions.
//!
//! Group 0x6: Bcc, BRA, BSR
//! Group 0x5 (SS=11): Scc, DBcc

use crate::addressing::AddrMode;
use crate::alu::Size;
use crate::cpu::Cpu68000;
use crate::decode::ea_field;
use crate::exceptions::Exception;
use crate::flags::Status;
use crate::timing;

impl Cpu68000 {
    // ================================================================
    // Bcc / BRA / BSR  (group 0x6)
    // ================================================================
    //
    // Encoding: 0110 CCCC DDDDDDDD
    //   CCCC = condition (0000=BRA, 0001=BSR, others=Bcc)
    //   DDDDDDDD = 8-bit displacement (0 = 16-bit displacement in ext word)
    //
    // Displacements are relative to the address of the extension word,
    // i.e. the opcode address + 2, for both forms.
    //
    // Timing:
    //   Bcc taken:                10 cycles
    //   Bcc not taken (8-bit):     8 cycles
    //   Bcc not taken (16-bit):   12 cycles
    //   BRA:                      10 cycles
    //   BSR:                      18 cycles

    pub(crate) fn exec_branch(&mut self, op: u16) -> Result<u32, Exception> {
        let cond = ((op >> 8) & 0xF) as u8;
        let base = self.regs.pc;
        let (disp, short) = match op & 0xFF {
            0 => (i32::from(self.fetch_word()? as i16), false),
            d => (i32::from(d as u8 as i8), true),
        };
        let target = base.wrapping_add_signed(disp);

        match cond {
            0x1 => {
                self.push_long(self.regs.pc)?;
                self.regs.pc = target;
                Ok(18)
            }
            _ if Status::condition(self.regs.sr(), cond) => {
                self.regs.pc = target;
                Ok(10)
            }
            _ => Ok(if short { 8 } else { 12 }),
        }
    }

    // ================================================================
    // DBcc  (0101 CCCC 11001 RRR + disp16)
    // ================================================================
    //
    //   condition true:          12 cycles, no decrement
    //   counter != -1, branch:   10 cycles
    //   counter expired:         14 cycles

    pub(crate) fn exec_dbcc(&mut self, op: u16) -> Result<u32, Exception> {
        let cond = ((op >> 8) & 0xF) as u8;
        let reg = usize::from(op & 7);
        let base = self.regs.pc;
        let disp = self.fetch_word()? as i16;

        if Status::condition(self.regs.sr(), cond) {
            return Ok(12);
        }

        let counter = self.regs.d_word(reg).wrapping_sub(1);
        self.regs.set_d_word(reg, counter);
        if counter == 0xFFFF {
            Ok(14)
        } else {
            self.regs.pc = base.wrapping_add_signed(i32::from(disp));
            Ok(10)
        }
    }

    // ================================================================
    // Scc  (0101 CCCC 11 MMMRRR)
    // ================================================================
    //
    //   Dn: 4 cycles (false), 6 cycles (true)
    //   memory: 8 + ea

    pub(crate) fn exec_scc(&mut self, op: u16) -> Result<u32, Exception> {
        let cond = ((op >> 8) & 0xF) as u8;
        let mode = ea_field(op)?;
        if !mode.is_data_alterable() {
            return Err(Exception::Illegal);
        }

        let set = Status::condition(self.regs.sr(), cond);
        let target = self.resolve(mode, Size::Byte)?;
        self.write_operand(target, Size::Byte, if set { 0xFF } else { 0x00 })?;

        Ok(match mode {
            AddrMode::DataReg(_) => if set { 6 } else { 4 },
            _ => 8 + timing::ea(mode, Size::Byte),
        })
    }
}
