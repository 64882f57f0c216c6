//! Exception processing for the 68000.
//!
//! Exception groups:
//! - Group 0: bus error, address error (highest priority)
//! - Group 1: trace, interrupt, illegal instruction, privilege violation
//! - Group 2: TRAP, TRAPV, CHK, zero divide
//!
//! Standard exception frame (6 bytes): PC (long) + SR (word)
//! Group 0 exception frame (14 bytes): PC + SR + IR + fault addr + access info
//!
//! A fault while stacking a group 0 frame is a double fault: the CPU halts
//! until the host resets it.

use log::{debug, trace};

use crate::cpu::{Cpu68000, RunState};
use crate::flags::{IPL_MASK, S, T};
use crate::memory::AddressSpace;
use crate::timing;

/// Vector numbers.
pub mod vector {
    pub const BUS_ERROR: u8 = 2;
    pub const ADDRESS_ERROR: u8 = 3;
    pub const ILLEGAL: u8 = 4;
    pub const ZERO_DIVIDE: u8 = 5;
    pub const CHK: u8 = 6;
    pub const TRAPV: u8 = 7;
    pub const PRIVILEGE: u8 = 8;
    pub const TRACE: u8 = 9;
    pub const LINE_A: u8 = 10;
    pub const LINE_F: u8 = 11;
    pub const TRAP_BASE: u8 = 32;
}

/// The access that faulted, as recorded in a group 0 frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AccessFault {
    pub address: u32,
    pub space: AddressSpace,
    pub write: bool,
    /// Clear when the fault happened during exception processing.
    pub instruction: bool,
}

impl AccessFault {
    /// Special status word: R/W in bit 4, I/N in bit 3, FC in bits 0-2.
    pub(crate) const fn status_word(self) -> u16 {
        let rw = if self.write { 0 } else { 0x10 };
        let in_bit = if self.instruction { 0 } else { 0x08 };
        rw | in_bit | self.space.function_code() as u16
    }
}

/// Why an instruction did not complete normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Exception {
    BusError(AccessFault),
    AddressError(AccessFault),
    Illegal,
    Privilege,
    LineA,
    LineF,
    /// Trap taken after the instruction completed; the frame holds the
    /// address of the next instruction. `cycles` is the full cost.
    Trap { vector: u8, cycles: u32 },
}

impl Cpu68000 {
    /// Process an exception and return its cycle cost.
    pub(crate) fn take_exception(&mut self, exception: Exception) -> u32 {
        match exception {
            Exception::BusError(fault) => self.group0(vector::BUS_ERROR, fault),
            Exception::AddressError(fault) => self.group0(vector::ADDRESS_ERROR, fault),
            Exception::Illegal => self.group1(vector::ILLEGAL, self.instr_pc, timing::EXCEPTION),
            Exception::Privilege => self.group1(vector::PRIVILEGE, self.instr_pc, timing::EXCEPTION),
            Exception::LineA => self.group1(vector::LINE_A, self.instr_pc, timing::EXCEPTION),
            Exception::LineF => self.group1(vector::LINE_F, self.instr_pc, timing::EXCEPTION),
            Exception::Trap { vector, cycles } => self.group1(vector, self.regs.pc, cycles),
        }
    }

    /// Trace exception after an instruction that ran with T set.
    pub(crate) fn take_trace(&mut self) -> u32 {
        self.group1(vector::TRACE, self.regs.pc, timing::EXCEPTION)
    }

    /// Accept interrupt `level`: acknowledge, stack, raise the mask, vector.
    pub(crate) fn take_interrupt(&mut self, level: u8) -> u32 {
        let vector = self.irq.acknowledge(level).resolve(level);
        if let Some(iack) = self.hooks.iack.clone() {
            iack(level);
        }
        trace!("interrupt level {level} via vector {vector}");
        self.state = RunState::Running;
        self.dispatch(vector, self.regs.pc, Some(level), timing::INTERRUPT)
    }

    fn group1(&mut self, vector: u8, return_pc: u32, cycles: u32) -> u32 {
        trace!("exception vector {vector} at {:08X}", self.instr_pc);
        self.dispatch(vector, return_pc, None, cycles)
    }

    /// Stack a short frame and jump through `vector`. A fault while doing
    /// so escalates to a group 0 exception.
    fn dispatch(&mut self, vector: u8, return_pc: u32, mask: Option<u8>, cycles: u32) -> u32 {
        self.exception_processing = true;
        let result = self.enter(vector, return_pc, mask);
        self.exception_processing = false;
        match result {
            Ok(()) => cycles,
            Err(Exception::BusError(fault)) => cycles + self.group0(vector::BUS_ERROR, fault),
            Err(Exception::AddressError(fault)) => cycles + self.group0(vector::ADDRESS_ERROR, fault),
            Err(_) => {
                self.halt();
                cycles
            }
        }
    }

    fn enter(&mut self, vector: u8, return_pc: u32, mask: Option<u8>) -> Result<(), Exception> {
        if let Some(hook) = self.hooks.vector(vector) {
            self.regs.pc = return_pc;
            hook(vector, &mut self.regs);
            return Ok(());
        }

        let old_sr = self.regs.sr();
        let mut sr = (old_sr | S) & !T;
        if let Some(level) = mask {
            sr = (sr & !IPL_MASK) | (u16::from(level) << 8);
        }
        self.regs.set_sr(sr);
        self.push_long(return_pc)?;
        self.push_word(old_sr)?;
        self.regs.pc = self.read_vector(vector)?;
        Ok(())
    }

    /// Bus or address error. Any fault while building this frame halts.
    fn group0(&mut self, vector: u8, fault: AccessFault) -> u32 {
        trace!(
            "group 0 exception vector {vector}: {} {:08X}",
            if fault.write { "write" } else { "read" },
            fault.address
        );
        self.exception_processing = true;
        let result = self.enter_group0(vector, fault);
        self.exception_processing = false;
        if result.is_err() {
            self.halt();
        }
        timing::GROUP0_EXCEPTION
    }

    fn enter_group0(&mut self, vector: u8, fault: AccessFault) -> Result<(), Exception> {
        if let Some(hook) = self.hooks.vector(vector) {
            hook(vector, &mut self.regs);
            return Ok(());
        }

        let old_sr = self.regs.sr();
        self.regs.set_sr((old_sr | S) & !T);
        self.push_long(self.regs.pc)?;
        self.push_word(old_sr)?;
        self.push_word(self.opcode)?;
        self.push_long(fault.address)?;
        self.push_word(fault.status_word())?;
        self.regs.pc = self.read_vector(vector)?;
        Ok(())
    }

    /// Double fault: stop executing until reset.
    pub(crate) fn halt(&mut self) {
        debug!("double fault at {:08X}, CPU halted", self.instr_pc);
        self.state = RunState::Halted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_word_layout() {
        let fault = AccessFault {
            address: 0x1001,
            space: AddressSpace::SupervisorData,
            write: false,
            instruction: true,
        };
        assert_eq!(fault.status_word(), 0x15);

        let fault = AccessFault {
            write: true,
            instruction: false,
            space: AddressSpace::UserProgram,
            ..fault
        };
        assert_eq!(fault.status_word(), 0x0A);
    }
}
