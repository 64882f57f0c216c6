//! Status register layout and condition evaluation.
//!
//! ```text
//!  15  14  13  12  11  10   9   8   7   6   5   4   3   2   1   0
//!   T   -   S   -   -  I2  I1  I0   -   -   -   X   N   Z   V   C
//! ```
//!
//! The condition codes live in the low byte (CCR); the system byte holds
//! the trace bit, the supervisor bit and the three-bit interrupt mask.
//! Flags are never stored as separate booleans: instructions that save,
//! restore or test them operate on the packed word.

use crate::alu::Size;

/// Carry.
pub const C: u16 = 0x0001;
/// Overflow.
pub const V: u16 = 0x0002;
/// Zero.
pub const Z: u16 = 0x0004;
/// Negative.
pub const N: u16 = 0x0008;
/// Extend.
pub const X: u16 = 0x0010;

/// Supervisor state.
pub const S: u16 = 0x2000;
/// Trace mode.
pub const T: u16 = 0x8000;

/// Interrupt mask field (bits 8-10).
pub const IPL_MASK: u16 = 0x0700;
/// Condition code bits.
pub const CCR_MASK: u16 = 0x001F;
/// Bits that exist on the 68000; the rest read as zero.
pub const SR_MASK: u16 = 0xA71F;

/// Status-word helpers. All functions are pure: they take an SR and
/// return the updated SR.
pub struct Status;

impl Status {
    /// Set `flag` if `condition` holds, clear it otherwise.
    #[must_use]
    pub const fn set_if(sr: u16, flag: u16, condition: bool) -> u16 {
        if condition { sr | flag } else { sr & !flag }
    }

    /// Recompute N and Z from a result of the given size. Other bits kept.
    #[must_use]
    pub fn nz(sr: u16, value: u32, size: Size) -> u16 {
        let value = size.mask(value);
        let sr = Self::set_if(sr, Z, value == 0);
        Self::set_if(sr, N, value & size.msb() != 0)
    }

    /// Logical-result flags: N and Z from the value, V and C cleared,
    /// X untouched. Used by MOVE, AND, OR, EOR, NOT, TST, CLR and friends.
    #[must_use]
    pub fn logical(sr: u16, value: u32, size: Size) -> u16 {
        Self::nz(sr & !(V | C), value, size)
    }

    /// Evaluate one of the sixteen condition tests (Bcc/DBcc/Scc).
    #[must_use]
    pub const fn condition(sr: u16, cc: u8) -> bool {
        let c = sr & C != 0;
        let v = sr & V != 0;
        let z = sr & Z != 0;
        let n = sr & N != 0;
        match cc & 0x0F {
            0x0 => true,        // T
            0x1 => false,       // F
            0x2 => !c && !z,    // HI
            0x3 => c || z,      // LS
            0x4 => !c,          // CC
            0x5 => c,           // CS
            0x6 => !z,          // NE
            0x7 => z,           // EQ
            0x8 => !v,          // VC
            0x9 => v,           // VS
            0xA => !n,          // PL
            0xB => n,           // MI
            0xC => n == v,      // GE
            0xD => n != v,      // LT
            0xE => !z && n == v, // GT
            _ => z || n != v,   // LE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_clears_vc_and_keeps_x() {
        let sr = X | V | C;
        let sr = Status::logical(sr, 0x80, Size::Byte);
        assert_eq!(sr & (X | N | Z | V | C), X | N);
    }

    #[test]
    fn nz_only_looks_at_operand_width() {
        assert_eq!(Status::nz(0, 0x1_0000, Size::Word) & (N | Z), Z);
        assert_eq!(Status::nz(0, 0x8000, Size::Word) & (N | Z), N);
        assert_eq!(Status::nz(0, 0x8000, Size::Long) & (N | Z), 0);
    }

    #[test]
    fn signed_conditions_follow_n_xor_v() {
        // N set, V clear: less than.
        assert!(Status::condition(N, 0xD));
        assert!(!Status::condition(N, 0xC));
        // N and V both set: greater or equal.
        assert!(Status::condition(N | V, 0xC));
        assert!(Status::condition(N | V, 0xE));
        assert!(Status::condition(Z, 0xF));
    }

    #[test]
    fn unsigned_conditions() {
        assert!(Status::condition(0, 0x2));
        assert!(!Status::condition(C, 0x2));
        assert!(Status::condition(Z, 0x3));
        assert!(Status::condition(C, 0x5));
        assert!(Status::condition(0, 0x4));
    }
}
