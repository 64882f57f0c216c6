//! Arithmetic instruction execution: ADD, SUB, CMP, ADDA, SUBA, CMPA,
//! ADDQ, SUBQ, ADDX, SUBX, CMPM and EOR.
//!
//! ADD and SUB share their decode. Opmode (bits 6-8) selects direction:
//! - 0-2: `<ea>,Dn` (byte/word/long)
//! - 3, 7: `<ea>,An` (ADDA/SUBA word/long)
//! - 4-6: `Dn,<ea>` (memory destination); EA mode 0/1 here means ADDX/SUBX

use crate::addressing::AddrMode;
use crate::alu::{self, Size};
use crate::cpu::Cpu68000;
use crate::decode::{ea_field, reg_field, size_field};
use crate::exceptions::Exception;
use crate::flags::Status;
use crate::timing;

/// Cost of a long `<ea>,Rn` operation: 6 + ea, or 8 for register and
/// immediate sources.
const fn long_to_register(mode: AddrMode) -> u32 {
    if mode.is_register_or_immediate() {
        8 + timing::ea(mode, Size::Long)
    } else {
        6 + timing::ea(mode, Size::Long)
    }
}

impl Cpu68000 {
    pub(crate) fn exec_add_sub(&mut self, op: u16, is_add: bool) -> Result<u32, Exception> {
        let opmode = (op >> 6) & 7;
        let reg = reg_field(op);
        let mode = ea_field(op)?;
        let operation = if is_add { alu::add } else { alu::sub };

        match opmode {
            0..=2 => {
                let size = size_field(op)?;
                if size == Size::Byte && matches!(mode, AddrMode::AddrReg(_)) {
                    return Err(Exception::Illegal);
                }
                let src = self.read_ea(mode, size)?;
                let (result, sr) = operation(src, self.regs.d[reg], size, self.regs.sr());
                self.write_operand(crate::ea::Operand::DataReg(reg), size, result)?;
                self.regs.set_sr(sr);
                Ok(match size {
                    Size::Long => long_to_register(mode),
                    _ => 4 + timing::ea(mode, size),
                })
            }
            3 | 7 => {
                let size = if opmode == 7 { Size::Long } else { Size::Word };
                let src = size.sign_extend(self.read_ea(mode, size)?);
                let dst = self.regs.a[reg];
                self.regs.a[reg] = if is_add { dst.wrapping_add(src) } else { dst.wrapping_sub(src) };
                Ok(match size {
                    Size::Long => long_to_register(mode),
                    _ => 8 + timing::ea(mode, size),
                })
            }
            _ => {
                let size = size_field(op)?;
                match mode {
                    AddrMode::DataReg(_) | AddrMode::AddrReg(_) => self.exec_addx_subx(op, size, is_add),
                    _ if mode.is_memory_alterable() => {
                        let target = self.resolve(mode, size)?;
                        let dst = self.read_operand(target, size)?;
                        let (result, sr) = operation(self.regs.d[reg], dst, size, self.regs.sr());
                        self.write_operand(target, size, result)?;
                        self.regs.set_sr(sr);
                        Ok((if size == Size::Long { 12 } else { 8 }) + timing::ea(mode, size))
                    }
                    _ => Err(Exception::Illegal),
                }
            }
        }
    }

    /// ADDX/SUBX Dy,Dx and -(Ay),-(Ax).
    fn exec_addx_subx(&mut self, op: u16, size: Size, is_add: bool) -> Result<u32, Exception> {
        let rx = reg_field(op);
        let ry = usize::from(op & 7);
        let operation = if is_add { alu::addx } else { alu::subx };

        if op & 0x0008 == 0 {
            let (result, sr) = operation(self.regs.d[ry], self.regs.d[rx], size, self.regs.sr());
            self.write_operand(crate::ea::Operand::DataReg(rx), size, result)?;
            self.regs.set_sr(sr);
            return Ok(if size == Size::Long { 8 } else { 4 });
        }

        let src = self.read_ea(AddrMode::AddrIndPreDec(ry as u8), size)?;
        let target = self.resolve(AddrMode::AddrIndPreDec(rx as u8), size)?;
        let dst = self.read_operand(target, size)?;
        let (result, sr) = operation(src, dst, size, self.regs.sr());
        self.write_operand(target, size, result)?;
        self.regs.set_sr(sr);
        Ok(if size == Size::Long { 30 } else { 18 })
    }

    /// Line B: CMP, CMPA, CMPM, EOR.
    pub(crate) fn exec_cmp_eor(&mut self, op: u16) -> Result<u32, Exception> {
        let opmode = (op >> 6) & 7;
        let reg = reg_field(op);
        let mode = ea_field(op)?;

        match opmode {
            0..=2 => {
                let size = size_field(op)?;
                if size == Size::Byte && matches!(mode, AddrMode::AddrReg(_)) {
                    return Err(Exception::Illegal);
                }
                let src = self.read_ea(mode, size)?;
                let (_, sr) = alu::compare(src, self.regs.d[reg], size, self.regs.sr());
                self.regs.set_sr(sr);
                Ok((if size == Size::Long { 6 } else { 4 }) + timing::ea(mode, size))
            }
            3 | 7 => {
                let size = if opmode == 7 { Size::Long } else { Size::Word };
                let src = size.sign_extend(self.read_ea(mode, size)?);
                let (_, sr) = alu::compare(src, self.regs.a[reg], Size::Long, self.regs.sr());
                self.regs.set_sr(sr);
                Ok(6 + timing::ea(mode, size))
            }
            _ => {
                let size = size_field(op)?;
                if let AddrMode::AddrReg(ry) = mode {
                    return self.exec_cmpm(reg, usize::from(ry), size);
                }
                if !mode.is_data_alterable() {
                    return Err(Exception::Illegal);
                }
                let target = self.resolve(mode, size)?;
                let value = size.mask(self.read_operand(target, size)? ^ self.regs.d[reg]);
                self.write_operand(target, size, value)?;
                self.regs.set_sr(Status::logical(self.regs.sr(), value, size));
                let long = size == Size::Long;
                Ok(match mode {
                    AddrMode::DataReg(_) => if long { 8 } else { 4 },
                    _ => (if long { 12 } else { 8 }) + timing::ea(mode, size),
                })
            }
        }
    }

    /// CMPM (Ay)+,(Ax)+
    fn exec_cmpm(&mut self, rx: usize, ry: usize, size: Size) -> Result<u32, Exception> {
        let src = self.read_ea(AddrMode::AddrIndPostInc(ry as u8), size)?;
        let dst = self.read_ea(AddrMode::AddrIndPostInc(rx as u8), size)?;
        let (_, sr) = alu::compare(src, dst, size, self.regs.sr());
        self.regs.set_sr(sr);
        Ok(if size == Size::Long { 20 } else { 12 })
    }

    /// Line 5: ADDQ/SUBQ, or Scc/DBcc when the size field is 3.
    pub(crate) fn exec_quick_or_condition(&mut self, op: u16) -> Result<u32, Exception> {
        let Some(size) = Size::from_bits(op >> 6) else {
            return if op & 0x0038 == 0x0008 {
                self.exec_dbcc(op)
            } else {
                self.exec_scc(op)
            };
        };

        let mode = ea_field(op)?;
        if !mode.is_alterable() || (size == Size::Byte && matches!(mode, AddrMode::AddrReg(_))) {
            return Err(Exception::Illegal);
        }
        let data = match (op >> 9) & 7 {
            0 => 8,
            n => u32::from(n),
        };
        let is_sub = op & 0x0100 != 0;

        if let AddrMode::AddrReg(r) = mode {
            // Whole register, flags untouched.
            let r = usize::from(r);
            self.regs.a[r] = if is_sub {
                self.regs.a[r].wrapping_sub(data)
            } else {
                self.regs.a[r].wrapping_add(data)
            };
            return Ok(8);
        }

        let target = self.resolve(mode, size)?;
        let dst = self.read_operand(target, size)?;
        let (result, sr) = if is_sub {
            alu::sub(data, dst, size, self.regs.sr())
        } else {
            alu::add(data, dst, size, self.regs.sr())
        };
        self.write_operand(target, size, result)?;
        self.regs.set_sr(sr);

        let long = size == Size::Long;
        Ok(match mode {
            AddrMode::DataReg(_) => if long { 8 } else { 4 },
            _ => (if long { 12 } else { 8 }) + timing::ea(mode, size),
        })
    }
}
