//! Effective address calculation for the 68000.
//!
//! Resolving an EA consumes its extension words from the instruction
//! stream and applies any (An)+ / -(An) register update. The result is an
//! [`Operand`] that can then be read, written, or both (read-modify-write
//! instructions resolve once and access twice).

use crate::addressing::AddrMode;
use crate::alu::Size;
use crate::cpu::Cpu68000;
use crate::exceptions::Exception;

/// A resolved operand location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operand {
    DataReg(usize),
    AddrReg(usize),
    /// Memory operand. `program` is set for PC-relative modes, which read
    /// from program space.
    Memory { address: u32, program: bool },
    Immediate(u32),
}

impl Cpu68000 {
    /// Calculate the effective address for `mode`.
    pub(crate) fn resolve(&mut self, mode: AddrMode, size: Size) -> Result<Operand, Exception> {
        let memory = |address| Operand::Memory { address, program: false };
        Ok(match mode {
            AddrMode::DataReg(r) => Operand::DataReg(usize::from(r)),
            AddrMode::AddrReg(r) => Operand::AddrReg(usize::from(r)),
            AddrMode::AddrInd(r) => memory(self.regs.a[usize::from(r)]),
            AddrMode::AddrIndPostInc(r) => {
                let r = usize::from(r);
                let addr = self.regs.a[r];
                self.regs.a[r] = addr.wrapping_add(step(r, size));
                memory(addr)
            }
            AddrMode::AddrIndPreDec(r) => {
                let r = usize::from(r);
                let addr = self.regs.a[r].wrapping_sub(step(r, size));
                self.regs.a[r] = addr;
                memory(addr)
            }
            AddrMode::AddrIndDisp(r) => {
                let disp = self.fetch_word()? as i16;
                memory(self.regs.a[usize::from(r)].wrapping_add_signed(i32::from(disp)))
            }
            AddrMode::AddrIndIndex(r) => {
                let ext = self.fetch_word()?;
                memory(self.index(self.regs.a[usize::from(r)], ext))
            }
            AddrMode::AbsShort => memory(self.fetch_word()? as i16 as u32),
            AddrMode::AbsLong => memory(self.fetch_long()?),
            AddrMode::PcDisp => {
                // Base is the address of the extension word.
                let base = self.regs.pc;
                let disp = self.fetch_word()? as i16;
                Operand::Memory {
                    address: base.wrapping_add_signed(i32::from(disp)),
                    program: true,
                }
            }
            AddrMode::PcIndex => {
                let base = self.regs.pc;
                let ext = self.fetch_word()?;
                Operand::Memory {
                    address: self.index(base, ext),
                    program: true,
                }
            }
            AddrMode::Immediate => match size {
                Size::Byte => Operand::Immediate(u32::from(self.fetch_word()? & 0xFF)),
                Size::Word => Operand::Immediate(u32::from(self.fetch_word()?)),
                Size::Long => Operand::Immediate(self.fetch_long()?),
            },
        })
    }

    /// Brief extension word: base + d8 + Xn.W/Xn.L.
    fn index(&self, base: u32, ext: u16) -> u32 {
        let disp = i32::from(ext as u8 as i8);
        let reg = usize::from((ext >> 12) & 7);
        let value = if ext & 0x8000 == 0 { self.regs.d[reg] } else { self.regs.a[reg] };
        let xn = if ext & 0x0800 != 0 {
            value as i32
        } else {
            i32::from(value as i16)
        };
        base.wrapping_add_signed(disp).wrapping_add_signed(xn)
    }

    /// Address of a control-mode EA (LEA, PEA, JMP, JSR, MOVEM).
    pub(crate) fn control_address(&mut self, mode: AddrMode) -> Result<u32, Exception> {
        if !mode.is_control() {
            return Err(Exception::Illegal);
        }
        match self.resolve(mode, Size::Long)? {
            Operand::Memory { address, .. } => Ok(address),
            _ => Err(Exception::Illegal),
        }
    }

    pub(crate) fn read_operand(&self, operand: Operand, size: Size) -> Result<u32, Exception> {
        match operand {
            Operand::DataReg(r) => Ok(size.mask(self.regs.d[r])),
            Operand::AddrReg(r) => Ok(size.mask(self.regs.a[r])),
            Operand::Memory { address, program: false } => self.read_data(address, size),
            Operand::Memory { address, program: true } => {
                self.read_space(address, size, self.program_space())
            }
            Operand::Immediate(value) => Ok(value),
        }
    }

    /// Store a result. Byte and word writes to Dn keep the upper bits;
    /// writes to An always replace the whole register.
    pub(crate) fn write_operand(&mut self, operand: Operand, size: Size, value: u32) -> Result<(), Exception> {
        match operand {
            Operand::DataReg(r) => {
                match size {
                    Size::Byte => self.regs.set_d_byte(r, value as u8),
                    Size::Word => self.regs.set_d_word(r, value as u16),
                    Size::Long => self.regs.d[r] = value,
                }
                Ok(())
            }
            Operand::AddrReg(r) => {
                self.regs.a[r] = value;
                Ok(())
            }
            Operand::Memory { address, program: false } => self.write_data(address, size, value),
            Operand::Memory { program: true, .. } | Operand::Immediate(_) => Err(Exception::Illegal),
        }
    }

    /// Resolve and read in one go.
    pub(crate) fn read_ea(&mut self, mode: AddrMode, size: Size) -> Result<u32, Exception> {
        let operand = self.resolve(mode, size)?;
        self.read_operand(operand, size)
    }
}

/// (An)+ / -(An) step. Byte accesses through A7 move it by 2 so the stack
/// stays word aligned.
const fn step(reg: usize, size: Size) -> u32 {
    match size {
        Size::Byte if reg == 7 => 2,
        _ => size.bytes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_pointer_byte_step_is_two() {
        assert_eq!(step(7, Size::Byte), 2);
        assert_eq!(step(6, Size::Byte), 1);
        assert_eq!(step(7, Size::Word), 2);
        assert_eq!(step(7, Size::Long), 4);
    }
}
