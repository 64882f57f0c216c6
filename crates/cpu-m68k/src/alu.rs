//! Operand sizes and the pure arithmetic/logic unit.
//!
//! Every function here takes its operands plus the current SR and returns
//! the result together with the new SR. No CPU state is touched, which
//! keeps the flag formulas testable in isolation.

use crate::flags::{Status, C, N, V, X, Z};

/// Operation size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    /// 8-bit byte operation.
    Byte,
    /// 16-bit word operation.
    Word,
    /// 32-bit long operation.
    Long,
}

impl Size {
    /// Standard two-bit size field: 00 = byte, 01 = word, 10 = long.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Option<Self> {
        match bits & 3 {
            0 => Some(Self::Byte),
            1 => Some(Self::Word),
            2 => Some(Self::Long),
            _ => None,
        }
    }

    /// MOVE size field: 01 = byte, 11 = word, 10 = long.
    #[must_use]
    pub const fn from_move_bits(bits: u16) -> Option<Self> {
        match bits & 3 {
            1 => Some(Self::Byte),
            3 => Some(Self::Word),
            2 => Some(Self::Long),
            _ => None,
        }
    }

    #[must_use]
    pub const fn bytes(self) -> u32 {
        match self {
            Self::Byte => 1,
            Self::Word => 2,
            Self::Long => 4,
        }
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.bytes() * 8
    }

    /// Sign bit for this size.
    #[must_use]
    pub const fn msb(self) -> u32 {
        match self {
            Self::Byte => 0x80,
            Self::Word => 0x8000,
            Self::Long => 0x8000_0000,
        }
    }

    /// Truncate a value to this size.
    #[must_use]
    pub const fn mask(self, value: u32) -> u32 {
        match self {
            Self::Byte => value & 0xFF,
            Self::Word => value & 0xFFFF,
            Self::Long => value,
        }
    }

    /// Sign-extend a value of this size to 32 bits.
    #[must_use]
    pub const fn sign_extend(self, value: u32) -> u32 {
        match self {
            Self::Byte => value as u8 as i8 as i32 as u32,
            Self::Word => value as u16 as i16 as i32 as u32,
            Self::Long => value,
        }
    }
}

/// `dst + src`, setting X N Z V C.
#[must_use]
pub fn add(src: u32, dst: u32, size: Size, sr: u16) -> (u32, u16) {
    let (src, dst) = (size.mask(src), size.mask(dst));
    let wide = u64::from(src) + u64::from(dst);
    let result = size.mask(wide as u32);
    let carry = wide > u64::from(size.mask(u32::MAX));
    let overflow = (!(src ^ dst) & (src ^ result) & size.msb()) != 0;
    let sr = Status::nz(sr, result, size);
    let sr = Status::set_if(sr, V, overflow);
    let sr = Status::set_if(sr, C, carry);
    (result, Status::set_if(sr, X, carry))
}

/// `dst - src`, setting X N Z V C.
#[must_use]
pub fn sub(src: u32, dst: u32, size: Size, sr: u16) -> (u32, u16) {
    let (result, sr) = compare(src, dst, size, sr);
    (result, Status::set_if(sr, X, sr & C != 0))
}

/// `dst - src` for CMP/CMPA/CMPI/CMPM: N Z V C only, X untouched.
#[must_use]
pub fn compare(src: u32, dst: u32, size: Size, sr: u16) -> (u32, u16) {
    let (src, dst) = (size.mask(src), size.mask(dst));
    let result = size.mask(dst.wrapping_sub(src));
    let overflow = ((src ^ dst) & (dst ^ result) & size.msb()) != 0;
    let sr = Status::nz(sr, result, size);
    let sr = Status::set_if(sr, V, overflow);
    (result, Status::set_if(sr, C, src > dst))
}

/// `dst + src + X`. Z is only ever cleared, so multi-precision chains
/// report zero only if every part was zero.
#[must_use]
pub fn addx(src: u32, dst: u32, size: Size, sr: u16) -> (u32, u16) {
    let (src, dst) = (size.mask(src), size.mask(dst));
    let wide = u64::from(src) + u64::from(dst) + u64::from(sr & X != 0);
    let result = size.mask(wide as u32);
    let carry = wide > u64::from(size.mask(u32::MAX));
    let overflow = (!(src ^ dst) & (src ^ result) & size.msb()) != 0;
    (result, extend_flags(sr, result, size, overflow, carry))
}

/// `dst - src - X`, with the same sticky-Z rule as [`addx`].
#[must_use]
pub fn subx(src: u32, dst: u32, size: Size, sr: u16) -> (u32, u16) {
    let (src, dst) = (size.mask(src), size.mask(dst));
    let x = u64::from(sr & X != 0);
    let result = size.mask((u64::from(dst).wrapping_sub(u64::from(src) + x)) as u32);
    let carry = u64::from(src) + x > u64::from(dst);
    let overflow = ((src ^ dst) & (dst ^ result) & size.msb()) != 0;
    (result, extend_flags(sr, result, size, overflow, carry))
}

fn extend_flags(sr: u16, result: u32, size: Size, overflow: bool, carry: bool) -> u16 {
    let mut sr = sr;
    if result != 0 {
        sr &= !Z;
    }
    sr = Status::set_if(sr, N, result & size.msb() != 0);
    sr = Status::set_if(sr, V, overflow);
    sr = Status::set_if(sr, C, carry);
    Status::set_if(sr, X, carry)
}

/// `0 - value`.
#[must_use]
pub fn neg(value: u32, size: Size, sr: u16) -> (u32, u16) {
    sub(value, 0, size, sr)
}

/// `0 - value - X`.
#[must_use]
pub fn negx(value: u32, size: Size, sr: u16) -> (u32, u16) {
    subx(value, 0, size, sr)
}

/// Packed-BCD `dst + src + X` (ABCD). Returns the new SR with C/X set on
/// decimal carry and Z only ever cleared.
#[must_use]
pub fn abcd(src: u8, dst: u8, sr: u16) -> (u8, u16) {
    let extend = u8::from(sr & X != 0);
    let low_sum = (dst & 0x0F) + (src & 0x0F) + extend;
    let low_fix: u16 = if low_sum > 9 { 6 } else { 0 };
    let binary = u16::from(dst) + u16::from(src) + u16::from(extend);

    let low_carry = (u16::from(low_sum) + low_fix) >> 4;
    let carry = u16::from(dst >> 4) + u16::from(src >> 4) + low_carry > 9;
    let result = binary + low_fix + if carry { 0x60 } else { 0 };
    let overflow = (!binary & result & 0x80) != 0;

    (result as u8, bcd_flags(sr, result as u8, overflow, carry))
}

/// Packed-BCD `dst - src - X` (SBCD).
#[must_use]
pub fn sbcd(src: u8, dst: u8, sr: u16) -> (u8, u16) {
    let extend = u8::from(sr & X != 0);
    let binary = dst.wrapping_sub(src).wrapping_sub(extend);
    let mut result = binary;

    let low_borrow = (dst & 0x0F) < (src & 0x0F) + extend;
    if low_borrow {
        result = result.wrapping_sub(6);
    }
    let high_borrow = (dst >> 4) < (src >> 4) + u8::from(low_borrow);
    if high_borrow {
        result = result.wrapping_sub(0x60);
    }
    let borrow = high_borrow || (low_borrow && binary < 6);
    let overflow = (binary & !result & 0x80) != 0;

    (result, bcd_flags(sr, result, overflow, borrow))
}

/// Packed-BCD `0 - value - X` (NBCD).
#[must_use]
pub fn nbcd(value: u8, sr: u16) -> (u8, u16) {
    sbcd(value, 0, sr)
}

fn bcd_flags(sr: u16, result: u8, overflow: bool, carry: bool) -> u16 {
    let mut sr = sr;
    if result != 0 {
        sr &= !Z;
    }
    sr = Status::set_if(sr, N, result & 0x80 != 0);
    sr = Status::set_if(sr, V, overflow);
    sr = Status::set_if(sr, C, carry);
    Status::set_if(sr, X, carry)
}

/// Shift/rotate family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftKind {
    /// ASL/ASR.
    Arithmetic,
    /// LSL/LSR.
    Logical,
    /// ROXL/ROXR: rotate through X.
    RotateExtend,
    /// ROL/ROR.
    Rotate,
}

impl ShiftKind {
    /// Decode the two-bit type field of a shift opcode.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        match bits & 3 {
            0 => Self::Arithmetic,
            1 => Self::Logical,
            2 => Self::RotateExtend,
            _ => Self::Rotate,
        }
    }
}

/// Shift or rotate `value` by `count` (0-63) positions.
///
/// A zero count still sets N and Z and clears V; C is cleared, except for
/// ROXL/ROXR where it receives X. X is untouched by zero counts and by
/// ROL/ROR.
#[must_use]
pub fn shift(kind: ShiftKind, left: bool, value: u32, count: u32, size: Size, sr: u16) -> (u32, u16) {
    let msb = size.msb();
    let mut v = size.mask(value);
    let mut x = sr & X != 0;
    let mut carry = false;
    let mut overflow = false;

    for _ in 0..count {
        match (kind, left) {
            (ShiftKind::Arithmetic, true) => {
                carry = v & msb != 0;
                let before = v & msb;
                v = size.mask(v << 1);
                overflow |= v & msb != before;
                x = carry;
            }
            (ShiftKind::Arithmetic, false) => {
                carry = v & 1 != 0;
                v = (v >> 1) | (v & msb);
                x = carry;
            }
            (ShiftKind::Logical, true) => {
                carry = v & msb != 0;
                v = size.mask(v << 1);
                x = carry;
            }
            (ShiftKind::Logical, false) => {
                carry = v & 1 != 0;
                v >>= 1;
                x = carry;
            }
            (ShiftKind::RotateExtend, true) => {
                carry = v & msb != 0;
                v = size.mask(v << 1) | u32::from(x);
                x = carry;
            }
            (ShiftKind::RotateExtend, false) => {
                carry = v & 1 != 0;
                v = (v >> 1) | if x { msb } else { 0 };
                x = carry;
            }
            (ShiftKind::Rotate, true) => {
                carry = v & msb != 0;
                v = size.mask(v << 1) | u32::from(carry);
            }
            (ShiftKind::Rotate, false) => {
                carry = v & 1 != 0;
                v = (v >> 1) | if carry { msb } else { 0 };
            }
        }
    }

    let mut sr = Status::nz(sr, v, size);
    sr = Status::set_if(sr, V, overflow);
    if count == 0 {
        let c = kind == ShiftKind::RotateExtend && x;
        return (v, Status::set_if(sr, C, c));
    }
    sr = Status::set_if(sr, C, carry);
    if kind != ShiftKind::Rotate {
        sr = Status::set_if(sr, X, x);
    }
    (v, sr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_byte_carry_and_overflow() {
        let (r, sr) = add(0x01, 0xFF, Size::Byte, 0);
        assert_eq!(r, 0);
        assert_eq!(sr & (X | N | Z | V | C), X | Z | C);

        let (r, sr) = add(0x01, 0x7F, Size::Byte, 0);
        assert_eq!(r, 0x80);
        assert_eq!(sr & (X | N | Z | V | C), N | V);
    }

    #[test]
    fn sub_long_borrow() {
        let (r, sr) = sub(1, 0, Size::Long, 0);
        assert_eq!(r, 0xFFFF_FFFF);
        assert_eq!(sr & (X | N | Z | V | C), X | N | C);
    }

    #[test]
    fn compare_leaves_x_alone() {
        let (_, sr) = compare(2, 1, Size::Word, X);
        assert_eq!(sr & X, X);
        let (_, sr) = compare(2, 1, Size::Word, 0);
        assert_eq!(sr & (X | C), C);
    }

    #[test]
    fn addx_z_is_sticky() {
        // Z clear on entry stays clear even for a zero result.
        let (r, sr) = addx(0, 0, Size::Word, 0);
        assert_eq!(r, 0);
        assert_eq!(sr & Z, 0);
        // Z set on entry survives a zero result.
        let (_, sr) = addx(0, 0, Size::Word, Z);
        assert_eq!(sr & Z, Z);
        // X feeds into the sum.
        let (r, _) = addx(1, 1, Size::Byte, X);
        assert_eq!(r, 3);
    }

    #[test]
    fn subx_borrows_through_x() {
        let (r, sr) = subx(0, 0, Size::Byte, X | Z);
        assert_eq!(r, 0xFF);
        assert_eq!(sr & (X | C | Z | N), X | C | N);
    }

    #[test]
    fn negx_of_zero_without_extend_is_zero() {
        let (r, sr) = negx(0, Size::Long, Z);
        assert_eq!(r, 0);
        assert_eq!(sr & (Z | C), Z);
    }

    #[test]
    fn bcd_add_decimal_carry() {
        let (r, sr) = abcd(0x01, 0x99, Z);
        assert_eq!(r, 0x00);
        assert_eq!(sr & (X | C | Z), X | C | Z);

        let (r, sr) = abcd(0x27, 0x15, 0);
        assert_eq!(r, 0x42);
        assert_eq!(sr & C, 0);
    }

    #[test]
    fn bcd_sub_decimal_borrow() {
        let (r, sr) = sbcd(0x15, 0x42, 0);
        assert_eq!(r, 0x27);
        assert_eq!(sr & C, 0);

        let (r, sr) = sbcd(0x01, 0x00, 0);
        assert_eq!(r, 0x99);
        assert_eq!(sr & (X | C), X | C);
    }

    #[test]
    fn asl_sets_overflow_when_sign_changes() {
        let (r, sr) = shift(ShiftKind::Arithmetic, true, 0x40, 1, Size::Byte, 0);
        assert_eq!(r, 0x80);
        assert_eq!(sr & (V | N | C), V | N);
    }

    #[test]
    fn asr_replicates_sign() {
        let (r, sr) = shift(ShiftKind::Arithmetic, false, 0x8001, 1, Size::Word, 0);
        assert_eq!(r, 0xC000);
        assert_eq!(sr & (X | C | N), X | C | N);
    }

    #[test]
    fn lsr_past_width_clears_everything() {
        let (r, sr) = shift(ShiftKind::Logical, false, 0xFF, 9, Size::Byte, 0);
        assert_eq!(r, 0);
        assert_eq!(sr & (Z | C | X), Z);
    }

    #[test]
    fn rotate_keeps_x() {
        let (r, sr) = shift(ShiftKind::Rotate, true, 0x8000_0001, 1, Size::Long, X);
        assert_eq!(r, 3);
        assert_eq!(sr & (X | C), X | C);
    }

    #[test]
    fn roxr_with_zero_count_copies_x_to_c() {
        let (r, sr) = shift(ShiftKind::RotateExtend, false, 0x12, 0, Size::Byte, X);
        assert_eq!(r, 0x12);
        assert_eq!(sr & (X | C), X | C);
    }

    #[test]
    fn roxl_rotates_through_extend() {
        let (r, sr) = shift(ShiftKind::RotateExtend, true, 0x80, 1, Size::Byte, X);
        assert_eq!(r, 0x01);
        assert_eq!(sr & (X | C | Z), X | C);
    }
}
