//! Instruction decode for the 68000.
//!
//! The top four opcode bits select an instruction line; each line's
//! handler decodes the rest and returns the instruction's cycle cost, or
//! the exception it raised.

use crate::addressing::AddrMode;
use crate::alu::Size;
use crate::cpu::Cpu68000;
use crate::exceptions::Exception;

impl Cpu68000 {
    /// Execute the opcode just fetched from `instr_pc`.
    pub(crate) fn execute(&mut self, op: u16) -> Result<u32, Exception> {
        match op >> 12 {
            // ORI/ANDI/SUBI/ADDI/EORI/CMPI, bit operations, MOVEP
            0x0 => self.exec_group0(op),
            // MOVE.B / MOVE.L / MOVE.W (and MOVEA)
            0x1..=0x3 => self.exec_move(op),
            // Miscellaneous: LEA, CLR, NEG, NOT, TST, JMP, JSR, RTS, RTE, ...
            0x4 => self.exec_group4(op),
            // ADDQ/SUBQ/Scc/DBcc: 0101 DDD O SS MMMRRR
            0x5 => self.exec_quick_or_condition(op),
            // Bcc/BRA/BSR: 0110 CCCC DDDDDDDD
            0x6 => self.exec_branch(op),
            // MOVEQ: 0111 RRR 0 DDDDDDDD
            0x7 if op & 0x0100 == 0 => Ok(self.exec_moveq(op)),
            // OR/DIVU/DIVS/SBCD: 1000 RRR OOO MMMRRR
            0x8 => self.exec_or(op),
            // SUB/SUBA/SUBX: 1001 RRR OOO MMMRRR
            0x9 => self.exec_add_sub(op, false),
            // Line A: unimplemented, vector 10
            0xA => Err(Exception::LineA),
            // CMP/CMPA/CMPM/EOR: 1011 RRR OOO MMMRRR
            0xB => self.exec_cmp_eor(op),
            // AND/MULU/MULS/ABCD/EXG: 1100 RRR OOO MMMRRR
            0xC => self.exec_and(op),
            // ADD/ADDA/ADDX: 1101 RRR OOO MMMRRR
            0xD => self.exec_add_sub(op, true),
            // Shifts/rotates: 1110 CCC D SS I TT RRR
            0xE => self.exec_shift_rotate(op),
            // Line F: unimplemented, vector 11
            0xF => Err(Exception::LineF),
            _ => Err(Exception::Illegal),
        }
    }
}

/// EA field in bits 0-5.
pub(crate) fn ea_field(op: u16) -> Result<AddrMode, Exception> {
    AddrMode::from_opcode(op).ok_or(Exception::Illegal)
}

/// Register field in bits 9-11.
pub(crate) const fn reg_field(op: u16) -> usize {
    ((op >> 9) & 7) as usize
}

/// Standard size field in bits 6-7.
pub(crate) fn size_field(op: u16) -> Result<Size, Exception> {
    Size::from_bits(op >> 6).ok_or(Exception::Illegal)
}
