//! Miscellaneous instructions (group 0x4).
//!
//! This is the largest instruction group on the 68000:
//! NOP, CLR, NEG, NEGX, NOT, TST, TAS, NBCD, JMP, JSR, RTS, RTE, RTR,
//! SWAP, EXT, LEA, PEA, LINK, UNLK, MOVEM, MOVE to/from SR/CCR/USP,
//! CHK, TRAP, TRAPV, RESET, STOP and ILLEGAL.

use crate::addressing::AddrMode;
use crate::alu::{self, Size};
use crate::cpu::Cpu68000;
use crate::decode::{ea_field, reg_field, size_field};
use crate::exceptions::{vector, Exception};
use crate::flags::{Status, C, N, V, Z};
use crate::timing;

/// Read-modify-write operation used by NEGX/CLR/NEG/NOT.
type UnaryOp = fn(u32, Size, u16) -> (u32, u16);

impl Cpu68000 {
    pub(crate) fn exec_group4(&mut self, op: u16) -> Result<u32, Exception> {
        if op & 0x0100 != 0 {
            return match op & 0x01C0 {
                0x01C0 => self.exec_lea(op),
                0x0180 => self.exec_chk(op),
                _ => Err(Exception::Illegal),
            };
        }

        let sized = (op >> 6) & 3 != 3;
        let register_mode = op & 0x0038 == 0;
        match (op >> 8) & 0xF {
            0x0 if sized => self.exec_unary(op, alu::negx),
            0x0 => self.exec_move_from_sr(op),
            0x2 if sized => self.exec_unary(op, |_, size, sr| (0, Status::logical(sr, 0, size))),
            0x4 if sized => self.exec_unary(op, alu::neg),
            0x4 => self.exec_move_to_sr(op, false),
            0x6 if sized => self.exec_unary(op, |v, size, sr| {
                let r = size.mask(!v);
                (r, Status::logical(sr, r, size))
            }),
            0x6 => self.exec_move_to_sr(op, true),
            0x8 => match (op >> 6) & 3 {
                0 => self.exec_nbcd(op),
                1 if register_mode => Ok(self.exec_swap(op)),
                1 => self.exec_pea(op),
                2 if register_mode => Ok(self.exec_ext(op, Size::Word)),
                3 if register_mode => Ok(self.exec_ext(op, Size::Long)),
                _ => self.exec_movem(op, true),
            },
            0xA if op == 0x4AFC => Err(Exception::Illegal),
            0xA if sized => self.exec_tst(op),
            0xA => self.exec_tas(op),
            0xC if !sized || (op >> 6) & 3 == 2 => self.exec_movem(op, false),
            0xE => match (op >> 6) & 3 {
                1 => self.exec_group4_control(op),
                2 => self.exec_jsr(op),
                3 => self.exec_jmp(op),
                _ => Err(Exception::Illegal),
            },
            _ => Err(Exception::Illegal),
        }
    }

    /// 0x4E40-0x4E7F: TRAP, LINK, UNLK, MOVE USP, RESET, NOP, STOP, RTE,
    /// RTS, TRAPV, RTR.
    fn exec_group4_control(&mut self, op: u16) -> Result<u32, Exception> {
        let r = usize::from(op & 7);
        match op & 0x0038 {
            0x0000 | 0x0008 => Err(Exception::Trap {
                vector: vector::TRAP_BASE + (op & 0xF) as u8,
                cycles: timing::EXCEPTION,
            }),
            0x0010 => self.exec_link(r),
            0x0018 => self.exec_unlk(r),
            0x0020 => {
                self.require_supervisor()?;
                let value = self.regs.a[r];
                self.regs.set_usp(value);
                Ok(4)
            }
            0x0028 => {
                self.require_supervisor()?;
                self.regs.a[r] = self.regs.usp();
                Ok(4)
            }
            _ => match op {
                0x4E70 => {
                    self.require_supervisor()?;
                    self.assert_reset_line();
                    Ok(132)
                }
                0x4E71 => Ok(4),
                0x4E72 => {
                    self.require_supervisor()?;
                    let sr = self.fetch_word()?;
                    self.regs.set_sr(sr);
                    self.enter_stop();
                    Ok(4)
                }
                0x4E73 => self.exec_rte(),
                0x4E75 => {
                    self.regs.pc = self.pop_long()?;
                    Ok(16)
                }
                0x4E76 => {
                    if self.regs.sr() & V != 0 {
                        Err(Exception::Trap {
                            vector: vector::TRAPV,
                            cycles: timing::EXCEPTION,
                        })
                    } else {
                        Ok(4)
                    }
                }
                0x4E77 => {
                    let ccr = self.pop_word()?;
                    let pc = self.pop_long()?;
                    self.regs.set_ccr(ccr as u8);
                    self.regs.pc = pc;
                    Ok(20)
                }
                _ => Err(Exception::Illegal),
            },
        }
    }

    /// NEGX/CLR/NEG/NOT <ea>
    fn exec_unary(&mut self, op: u16, operation: UnaryOp) -> Result<u32, Exception> {
        let size = size_field(op)?;
        let mode = ea_field(op)?;
        if !mode.is_data_alterable() {
            return Err(Exception::Illegal);
        }
        let target = self.resolve(mode, size)?;
        let value = self.read_operand(target, size)?;
        let (result, sr) = operation(value, size, self.regs.sr());
        self.write_operand(target, size, result)?;
        self.regs.set_sr(sr);

        let long = size == Size::Long;
        Ok(match mode {
            AddrMode::DataReg(_) => if long { 6 } else { 4 },
            _ => (if long { 12 } else { 8 }) + timing::ea(mode, size),
        })
    }

    fn exec_tst(&mut self, op: u16) -> Result<u32, Exception> {
        let size = size_field(op)?;
        let mode = ea_field(op)?;
        if !mode.is_data_alterable() {
            return Err(Exception::Illegal);
        }
        let value = self.read_ea(mode, size)?;
        self.regs.set_sr(Status::logical(self.regs.sr(), value, size));
        Ok(4 + timing::ea(mode, size))
    }

    /// TAS: test a byte, then set its bit 7.
    fn exec_tas(&mut self, op: u16) -> Result<u32, Exception> {
        let mode = ea_field(op)?;
        if !mode.is_data_alterable() {
            return Err(Exception::Illegal);
        }
        let target = self.resolve(mode, Size::Byte)?;
        let value = self.read_operand(target, Size::Byte)?;
        self.regs.set_sr(Status::logical(self.regs.sr(), value, Size::Byte));
        self.write_operand(target, Size::Byte, value | 0x80)?;
        Ok(match mode {
            AddrMode::DataReg(_) => 4,
            _ => 10 + timing::ea(mode, Size::Byte),
        })
    }

    fn exec_nbcd(&mut self, op: u16) -> Result<u32, Exception> {
        let mode = ea_field(op)?;
        if !mode.is_data_alterable() {
            return Err(Exception::Illegal);
        }
        let target = self.resolve(mode, Size::Byte)?;
        let value = self.read_operand(target, Size::Byte)?;
        let (result, sr) = alu::nbcd(value as u8, self.regs.sr());
        self.write_operand(target, Size::Byte, u32::from(result))?;
        self.regs.set_sr(sr);
        Ok(match mode {
            AddrMode::DataReg(_) => 6,
            _ => 8 + timing::ea(mode, Size::Byte),
        })
    }

    fn exec_swap(&mut self, op: u16) -> u32 {
        let r = usize::from(op & 7);
        let value = self.regs.d[r].rotate_left(16);
        self.regs.d[r] = value;
        self.regs.set_sr(Status::logical(self.regs.sr(), value, Size::Long));
        4
    }

    /// EXT.W sign-extends a byte to a word; EXT.L a word to a long.
    fn exec_ext(&mut self, op: u16, size: Size) -> u32 {
        let r = usize::from(op & 7);
        let value = if size == Size::Word {
            let v = Size::Byte.sign_extend(self.regs.d[r]);
            self.regs.set_d_word(r, v as u16);
            v
        } else {
            let v = Size::Word.sign_extend(self.regs.d[r]);
            self.regs.d[r] = v;
            v
        };
        self.regs.set_sr(Status::logical(self.regs.sr(), value, size));
        4
    }

    fn exec_pea(&mut self, op: u16) -> Result<u32, Exception> {
        let mode = ea_field(op)?;
        let address = self.control_address(mode)?;
        self.push_long(address)?;
        Ok(timing::pea(mode))
    }

    fn exec_jmp(&mut self, op: u16) -> Result<u32, Exception> {
        let mode = ea_field(op)?;
        self.regs.pc = self.control_address(mode)?;
        Ok(timing::jmp(mode))
    }

    fn exec_jsr(&mut self, op: u16) -> Result<u32, Exception> {
        let mode = ea_field(op)?;
        let target = self.control_address(mode)?;
        self.push_long(self.regs.pc)?;
        self.regs.pc = target;
        Ok(timing::jsr(mode))
    }

    fn exec_rte(&mut self) -> Result<u32, Exception> {
        self.require_supervisor()?;
        let sr = self.pop_word()?;
        let pc = self.pop_long()?;
        self.regs.set_sr(sr);
        self.regs.pc = pc;
        Ok(20)
    }

    /// LINK An,#d16: push An, An = SP, SP += d16.
    fn exec_link(&mut self, r: usize) -> Result<u32, Exception> {
        let disp = self.fetch_word()? as i16;
        // LINK A7 stores the already-decremented stack pointer.
        let value = if r == 7 { self.regs.a[7].wrapping_sub(4) } else { self.regs.a[r] };
        self.push_long(value)?;
        self.regs.a[r] = self.regs.a[7];
        self.regs.a[7] = self.regs.a[7].wrapping_add_signed(i32::from(disp));
        Ok(16)
    }

    /// UNLK An: SP = An, An = (SP)+.
    fn exec_unlk(&mut self, r: usize) -> Result<u32, Exception> {
        self.regs.a[7] = self.regs.a[r];
        let value = self.pop_long()?;
        self.regs.a[r] = value;
        Ok(12)
    }

    fn exec_move_from_sr(&mut self, op: u16) -> Result<u32, Exception> {
        let mode = ea_field(op)?;
        if !mode.is_data_alterable() {
            return Err(Exception::Illegal);
        }
        let target = self.resolve(mode, Size::Word)?;
        self.write_operand(target, Size::Word, u32::from(self.regs.sr()))?;
        Ok(match mode {
            AddrMode::DataReg(_) => 6,
            _ => 8 + timing::ea(mode, Size::Word),
        })
    }

    /// MOVE <ea>,CCR and MOVE <ea>,SR (privileged).
    fn exec_move_to_sr(&mut self, op: u16, to_sr: bool) -> Result<u32, Exception> {
        if to_sr {
            self.require_supervisor()?;
        }
        let mode = ea_field(op)?;
        if !mode.is_data() {
            return Err(Exception::Illegal);
        }
        let value = self.read_ea(mode, Size::Word)? as u16;
        if to_sr {
            self.regs.set_sr(value);
        } else {
            self.regs.set_ccr(value as u8);
        }
        Ok(12 + timing::ea(mode, Size::Word))
    }

    /// CHK <ea>,Dn: trap if Dn.W < 0 or Dn.W > <ea>.
    fn exec_chk(&mut self, op: u16) -> Result<u32, Exception> {
        let mode = ea_field(op)?;
        if !mode.is_data() {
            return Err(Exception::Illegal);
        }
        let bound = self.read_ea(mode, Size::Word)? as u16 as i16;
        let value = self.regs.d_word(reg_field(op)) as i16;
        let ea = timing::ea(mode, Size::Word);

        let mut sr = self.regs.sr() & !(V | C);
        sr = Status::set_if(sr, Z, value == 0);
        if value < 0 || value > bound {
            sr = Status::set_if(sr, N, value < 0);
            self.regs.set_sr(sr);
            return Err(Exception::Trap {
                vector: vector::CHK,
                cycles: timing::CHK_TRAP + ea,
            });
        }
        self.regs.set_sr(sr);
        Ok(10 + ea)
    }

    /// MOVEM: 0100 1D00 1S MMMRRR + register mask.
    fn exec_movem(&mut self, op: u16, to_memory: bool) -> Result<u32, Exception> {
        let size = if op & 0x0040 != 0 { Size::Long } else { Size::Word };
        let mode = ea_field(op)?;
        let mask = self.fetch_word()?;
        let count = mask.count_ones();

        if to_memory {
            match mode {
                AddrMode::AddrIndPreDec(r) => {
                    let r = usize::from(r);
                    let mut address = self.regs.a[r];
                    // Predecrement masks are reversed: bit 0 is A7.
                    for i in (0..16).filter(|&i| mask & (1 << i) != 0) {
                        address = address.wrapping_sub(size.bytes());
                        let value = self.movem_register(15 - i);
                        self.write_data(address, size, value)?;
                    }
                    self.regs.a[r] = address;
                }
                _ if mode.is_control_alterable() => {
                    let mut address = self.control_address(mode)?;
                    for i in (0..16).filter(|&i| mask & (1 << i) != 0) {
                        let value = self.movem_register(i);
                        self.write_data(address, size, value)?;
                        address = address.wrapping_add(size.bytes());
                    }
                }
                _ => return Err(Exception::Illegal),
            }
        } else {
            let (mut address, postinc) = match mode {
                AddrMode::AddrIndPostInc(r) => (self.regs.a[usize::from(r)], Some(usize::from(r))),
                _ if mode.is_control() => (self.control_address(mode)?, None),
                _ => return Err(Exception::Illegal),
            };
            let space = if matches!(mode, AddrMode::PcDisp | AddrMode::PcIndex) {
                self.program_space()
            } else {
                self.data_space()
            };
            for i in (0..16).filter(|&i| mask & (1 << i) != 0) {
                let value = size.sign_extend(self.read_space(address, size, space)?);
                if i < 8 {
                    self.regs.d[i] = value;
                } else {
                    self.regs.a[i - 8] = value;
                }
                address = address.wrapping_add(size.bytes());
            }
            if let Some(r) = postinc {
                self.regs.a[r] = address;
            }
        }
        Ok(timing::movem(mode, to_memory, count, size))
    }

    /// Register `i` in MOVEM mask order: D0-D7 then A0-A7.
    const fn movem_register(&self, i: usize) -> u32 {
        if i < 8 { self.regs.d[i] } else { self.regs.a[i - 8] }
    }
}
