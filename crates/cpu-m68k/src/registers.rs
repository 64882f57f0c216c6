//! 68000 register file.
//!
//! - D0-D7: data registers (32-bit, with byte/word sub-views)
//! - A0-A7: address registers; `a[7]` is always the *active* stack pointer
//! - ASP: the inactive stack pointer (USP in supervisor mode, SSP in user mode)
//! - PC: program counter
//! - SR: status register (see [`crate::flags`])
//!
//! Only [`Registers::set_sr`] moves a value between `a[7]` and `asp`.

use crate::error::M68kError;
use crate::flags::{CCR_MASK, IPL_MASK, S, SR_MASK, T};

/// Register identifiers accepted by the host-facing accessors.
///
/// The discriminants are the host encoding: `D0 = 0` through `A7 = 15`,
/// then the shadow stack pointer, the program counter and the status
/// register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    D0,
    D1,
    D2,
    D3,
    D4,
    D5,
    D6,
    D7,
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
    A6,
    A7,
    /// The inactive stack pointer.
    Asp,
    Pc,
    Sr,
}

impl Register {
    const ALL: [Self; 19] = [
        Self::D0,
        Self::D1,
        Self::D2,
        Self::D3,
        Self::D4,
        Self::D5,
        Self::D6,
        Self::D7,
        Self::A0,
        Self::A1,
        Self::A2,
        Self::A3,
        Self::A4,
        Self::A5,
        Self::A6,
        Self::A7,
        Self::Asp,
        Self::Pc,
        Self::Sr,
    ];
}

impl TryFrom<u32> for Register {
    type Error = M68kError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        usize::try_from(raw)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(M68kError::InvalidRegister(raw))
    }
}

/// 68000 CPU register set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    /// Data registers D0-D7.
    pub d: [u32; 8],
    /// Address registers A0-A7. A7 is the stack pointer for the current mode.
    pub a: [u32; 8],
    /// Shadowed stack pointer for the mode not currently active.
    pub asp: u32,
    /// Program counter.
    pub pc: u32,
    sr: u16,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    /// Registers in reset state: all zero, supervisor mode, mask 7.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            d: [0; 8],
            a: [0; 8],
            asp: 0,
            pc: 0,
            sr: 0x2700,
        }
    }

    #[must_use]
    pub const fn sr(&self) -> u16 {
        self.sr
    }

    /// Write the full status register.
    ///
    /// Unimplemented bits read back as zero. Changing S swaps the active
    /// A7 with the shadow stack pointer.
    pub fn set_sr(&mut self, value: u16) {
        let value = value & SR_MASK;
        if (self.sr ^ value) & S != 0 {
            core::mem::swap(&mut self.a[7], &mut self.asp);
        }
        self.sr = value;
    }

    #[must_use]
    pub const fn ccr(&self) -> u8 {
        (self.sr & CCR_MASK) as u8
    }

    /// Replace the condition codes, leaving the system byte alone.
    pub fn set_ccr(&mut self, value: u8) {
        self.sr = (self.sr & !CCR_MASK) | (u16::from(value) & CCR_MASK);
    }

    #[must_use]
    pub const fn is_supervisor(&self) -> bool {
        self.sr & S != 0
    }

    #[must_use]
    pub const fn is_trace(&self) -> bool {
        self.sr & T != 0
    }

    /// Interrupt mask level (0-7).
    #[must_use]
    pub const fn interrupt_mask(&self) -> u8 {
        ((self.sr & IPL_MASK) >> 8) as u8
    }

    /// User stack pointer, wherever it currently lives.
    #[must_use]
    pub const fn usp(&self) -> u32 {
        if self.is_supervisor() { self.asp } else { self.a[7] }
    }

    pub fn set_usp(&mut self, value: u32) {
        if self.is_supervisor() {
            self.asp = value;
        } else {
            self.a[7] = value;
        }
    }

    /// Supervisor stack pointer, wherever it currently lives.
    #[must_use]
    pub const fn ssp(&self) -> u32 {
        if self.is_supervisor() { self.a[7] } else { self.asp }
    }

    pub fn set_ssp(&mut self, value: u32) {
        if self.is_supervisor() {
            self.a[7] = value;
        } else {
            self.asp = value;
        }
    }

    /// Low byte of a data register.
    #[must_use]
    pub const fn d_byte(&self, n: usize) -> u8 {
        self.d[n] as u8
    }

    /// Low word of a data register.
    #[must_use]
    pub const fn d_word(&self, n: usize) -> u16 {
        self.d[n] as u16
    }

    /// Replace the low byte of a data register, keeping bits 8-31.
    pub fn set_d_byte(&mut self, n: usize, value: u8) {
        self.d[n] = (self.d[n] & 0xFFFF_FF00) | u32::from(value);
    }

    /// Replace the low word of a data register, keeping bits 16-31.
    pub fn set_d_word(&mut self, n: usize, value: u16) {
        self.d[n] = (self.d[n] & 0xFFFF_0000) | u32::from(value);
    }

    /// Read by host identifier. SR is returned zero-extended.
    #[must_use]
    pub fn get(&self, reg: Register) -> u32 {
        match reg {
            Register::Asp => self.asp,
            Register::Pc => self.pc,
            Register::Sr => u32::from(self.sr),
            r => {
                let i = r as usize;
                if i < 8 { self.d[i] } else { self.a[i - 8] }
            }
        }
    }

    /// Write by host identifier. SR takes the low 16 bits (masked to the
    /// implemented bits, with the usual stack swap on S changes).
    pub fn set(&mut self, reg: Register, value: u32) {
        match reg {
            Register::Asp => self.asp = value,
            Register::Pc => self.pc = value,
            Register::Sr => self.set_sr(value as u16),
            r => {
                let i = r as usize;
                if i < 8 {
                    self.d[i] = value;
                } else {
                    self.a[i - 8] = value;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaving_supervisor_swaps_stack_pointers() {
        let mut regs = Registers::new();
        regs.a[7] = 0x0000_8000; // SSP
        regs.asp = 0x0000_4000; // USP
        regs.set_sr(0x0000);
        assert_eq!(regs.a[7], 0x4000);
        assert_eq!(regs.asp, 0x8000);
        assert_eq!(regs.usp(), 0x4000);
        assert_eq!(regs.ssp(), 0x8000);

        regs.set_sr(0x2000);
        assert_eq!(regs.a[7], 0x8000);
        assert_eq!(regs.asp, 0x4000);
    }

    #[test]
    fn same_mode_sr_write_does_not_swap() {
        let mut regs = Registers::new();
        regs.a[7] = 0x1234;
        regs.asp = 0x5678;
        regs.set_sr(0x2715);
        assert_eq!(regs.a[7], 0x1234);
        assert_eq!(regs.ccr(), 0x15);
        assert_eq!(regs.interrupt_mask(), 7);
    }

    #[test]
    fn unimplemented_sr_bits_read_as_zero() {
        let mut regs = Registers::new();
        regs.set_sr(0xFFFF);
        assert_eq!(regs.sr(), SR_MASK);
    }

    #[test]
    fn sub_views_keep_upper_bits() {
        let mut regs = Registers::new();
        regs.d[3] = 0x1234_5678;
        regs.set_d_byte(3, 0xAB);
        assert_eq!(regs.d[3], 0x1234_56AB);
        regs.set_d_word(3, 0xCDEF);
        assert_eq!(regs.d[3], 0x1234_CDEF);
        assert_eq!(regs.d_byte(3), 0xEF);
        assert_eq!(regs.d_word(3), 0xCDEF);
    }

    #[test]
    fn register_ids_validate_at_the_boundary() {
        assert_eq!(Register::try_from(0), Ok(Register::D0));
        assert_eq!(Register::try_from(15), Ok(Register::A7));
        assert_eq!(Register::try_from(18), Ok(Register::Sr));
        assert_eq!(Register::try_from(19), Err(M68kError::InvalidRegister(19)));
    }

    #[test]
    fn get_set_by_identifier() {
        let mut regs = Registers::new();
        for raw in 0..16 {
            let reg = Register::try_from(raw).unwrap();
            regs.set(reg, 0x1000 + raw);
            assert_eq!(regs.get(reg), 0x1000 + raw);
        }
        regs.set(Register::Sr, 0x0001_2704);
        assert_eq!(regs.get(Register::Sr), 0x2704);
    }
}
