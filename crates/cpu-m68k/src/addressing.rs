//! Addressing modes and their categories.
//!
//! The 68000 has 12 addressing modes, selected by the 3-bit mode field and,
//! for mode 7, the 3-bit register field. Each instruction accepts a subset
//! defined by the data / memory / control / alterable categories.

/// Addressing mode for 68000 instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    /// Data register direct: Dn
    DataReg(u8),
    /// Address register direct: An
    AddrReg(u8),
    /// Address register indirect: (An)
    AddrInd(u8),
    /// Address register indirect with postincrement: (An)+
    AddrIndPostInc(u8),
    /// Address register indirect with predecrement: -(An)
    AddrIndPreDec(u8),
    /// Address register indirect with displacement: d16(An)
    AddrIndDisp(u8),
    /// Address register indirect with index: d8(An,Xn)
    AddrIndIndex(u8),
    /// Absolute short: (xxx).W
    AbsShort,
    /// Absolute long: (xxx).L
    AbsLong,
    /// Program counter with displacement: d16(PC)
    PcDisp,
    /// Program counter with index: d8(PC,Xn)
    PcIndex,
    /// Immediate: #<data>
    Immediate,
}

impl AddrMode {
    /// Decode addressing mode from mode/register fields.
    #[must_use]
    pub const fn decode(mode: u8, reg: u8) -> Option<Self> {
        let reg = reg & 0x07;
        match mode & 0x07 {
            0 => Some(Self::DataReg(reg)),
            1 => Some(Self::AddrReg(reg)),
            2 => Some(Self::AddrInd(reg)),
            3 => Some(Self::AddrIndPostInc(reg)),
            4 => Some(Self::AddrIndPreDec(reg)),
            5 => Some(Self::AddrIndDisp(reg)),
            6 => Some(Self::AddrIndIndex(reg)),
            _ => match reg {
                0 => Some(Self::AbsShort),
                1 => Some(Self::AbsLong),
                2 => Some(Self::PcDisp),
                3 => Some(Self::PcIndex),
                4 => Some(Self::Immediate),
                _ => None,
            },
        }
    }

    /// Decode the source EA field in bits 0-5 of an opcode.
    #[must_use]
    pub const fn from_opcode(op: u16) -> Option<Self> {
        Self::decode(((op >> 3) & 7) as u8, (op & 7) as u8)
    }

    /// Every mode except An.
    #[must_use]
    pub const fn is_data(self) -> bool {
        !matches!(self, Self::AddrReg(_))
    }

    /// Modes that reference memory.
    #[must_use]
    pub const fn is_memory(self) -> bool {
        !matches!(self, Self::DataReg(_) | Self::AddrReg(_))
    }

    /// Modes usable by JMP/JSR/LEA/PEA and MOVEM.
    #[must_use]
    pub const fn is_control(self) -> bool {
        matches!(
            self,
            Self::AddrInd(_)
                | Self::AddrIndDisp(_)
                | Self::AddrIndIndex(_)
                | Self::AbsShort
                | Self::AbsLong
                | Self::PcDisp
                | Self::PcIndex
        )
    }

    /// Modes that may be written.
    #[must_use]
    pub const fn is_alterable(self) -> bool {
        !matches!(self, Self::PcDisp | Self::PcIndex | Self::Immediate)
    }

    #[must_use]
    pub const fn is_data_alterable(self) -> bool {
        self.is_data() && self.is_alterable()
    }

    #[must_use]
    pub const fn is_memory_alterable(self) -> bool {
        self.is_memory() && self.is_alterable()
    }

    #[must_use]
    pub const fn is_control_alterable(self) -> bool {
        self.is_control() && self.is_alterable()
    }

    /// Dn, An or #imm: the cases where long register-destination ALU ops
    /// take two extra cycles.
    #[must_use]
    pub const fn is_register_or_immediate(self) -> bool {
        matches!(self, Self::DataReg(_) | Self::AddrReg(_) | Self::Immediate)
    }
}

#[cfg(test)]
mod tests {
    use super::AddrMode;

    #[test]
    fn decode_covers_mode_seven() {
        assert_eq!(AddrMode::decode(7, 0), Some(AddrMode::AbsShort));
        assert_eq!(AddrMode::decode(7, 4), Some(AddrMode::Immediate));
        assert_eq!(AddrMode::decode(7, 5), None);
        assert_eq!(AddrMode::from_opcode(0x0018), Some(AddrMode::AddrIndPostInc(0)));
    }

    #[test]
    fn categories() {
        assert!(!AddrMode::AddrReg(0).is_data());
        assert!(AddrMode::AddrReg(0).is_alterable());
        assert!(!AddrMode::AddrIndPostInc(0).is_control());
        assert!(AddrMode::PcDisp.is_control());
        assert!(!AddrMode::PcDisp.is_alterable());
        assert!(AddrMode::AbsLong.is_memory_alterable());
        assert!(!AddrMode::DataReg(0).is_memory_alterable());
        assert!(AddrMode::DataReg(0).is_data_alterable());
    }
}
