//! MC68000 instruction timing.
//!
//! Costs are in clock cycles and include the opcode fetch. Effective
//! address costs are added on top of each instruction's base cost. DIVU and
//! DIVS use Jorge Cwik's cycle-exact model of the restoring division.

use crate::addressing::AddrMode;
use crate::alu::Size;

/// Bus or address error, including frame build.
pub const GROUP0_EXCEPTION: u32 = 50;
/// Interrupt acknowledge and frame build.
pub const INTERRUPT: u32 = 44;
/// Illegal, privilege, line A/F, trace, TRAP, TRAPV.
pub const EXCEPTION: u32 = 34;
/// CHK trap, before EA time.
pub const CHK_TRAP: u32 = 40;
/// Zero divide trap, before EA time.
pub const ZERO_DIVIDE: u32 = 38;

/// Effective-address calculation and operand fetch cost.
#[must_use]
pub const fn ea(mode: AddrMode, size: Size) -> u32 {
    let long = matches!(size, Size::Long);
    let base = match mode {
        AddrMode::DataReg(_) | AddrMode::AddrReg(_) => return 0,
        AddrMode::AddrInd(_) | AddrMode::AddrIndPostInc(_) | AddrMode::Immediate => 4,
        AddrMode::AddrIndPreDec(_) => 6,
        AddrMode::AddrIndDisp(_) | AddrMode::AbsShort | AddrMode::PcDisp => 8,
        AddrMode::AddrIndIndex(_) | AddrMode::PcIndex => 10,
        AddrMode::AbsLong => 12,
    };
    if long { base + 4 } else { base }
}

/// MOVE destination cost. Same as [`ea`] except that -(An) costs no more
/// than (An) when it is the destination.
#[must_use]
pub const fn move_destination(mode: AddrMode, size: Size) -> u32 {
    match mode {
        AddrMode::AddrIndPreDec(r) => ea(AddrMode::AddrInd(r), size),
        _ => ea(mode, size),
    }
}

/// Control-mode cost table shared by JMP, JSR, LEA and PEA, indexed as
/// (An), d16(An), d8(An,Xn), abs.W, abs.L, d16(PC), d8(PC,Xn).
const fn control_index(mode: AddrMode) -> usize {
    match mode {
        AddrMode::AddrIndDisp(_) => 1,
        AddrMode::AddrIndIndex(_) => 2,
        AddrMode::AbsShort => 3,
        AddrMode::AbsLong => 4,
        AddrMode::PcDisp => 5,
        AddrMode::PcIndex => 6,
        _ => 0,
    }
}

#[must_use]
pub const fn jmp(mode: AddrMode) -> u32 {
    [8, 10, 14, 10, 12, 10, 14][control_index(mode)]
}

#[must_use]
pub const fn jsr(mode: AddrMode) -> u32 {
    [16, 18, 22, 18, 20, 18, 22][control_index(mode)]
}

#[must_use]
pub const fn lea(mode: AddrMode) -> u32 {
    [4, 8, 12, 8, 12, 8, 12][control_index(mode)]
}

#[must_use]
pub const fn pea(mode: AddrMode) -> u32 {
    [12, 16, 20, 16, 20, 16, 20][control_index(mode)]
}

/// MOVEM base cost before the per-register charge. `to_memory` selects
/// the register-to-memory form.
#[must_use]
pub const fn movem(mode: AddrMode, to_memory: bool, count: u32, size: Size) -> u32 {
    let base = match mode {
        AddrMode::AddrIndDisp(_) | AddrMode::AbsShort | AddrMode::PcDisp => 12,
        AddrMode::AddrIndIndex(_) | AddrMode::PcIndex => 14,
        AddrMode::AbsLong => 16,
        _ => 8,
    };
    let base = if to_memory { base } else { base + 4 };
    let per = if matches!(size, Size::Long) { 8 } else { 4 };
    base + per * count
}

/// MULU: 38 + 2 per set bit in the source.
#[must_use]
pub const fn mulu(src: u16) -> u32 {
    38 + 2 * src.count_ones()
}

/// MULS: 38 + 2 per 01 or 10 transition in the source with a zero
/// appended below bit 0.
#[must_use]
pub const fn muls(src: u16) -> u32 {
    let pattern = ((src as u32) << 1) ^ (src as u32);
    38 + 2 * (pattern & 0xFFFF).count_ones()
}

/// DIVU cycles, excluding EA time.
#[must_use]
pub fn divu(dividend: u32, divisor: u16) -> u32 {
    if (dividend >> 16) >= u32::from(divisor) {
        return 10;
    }

    let mut mcycles: u32 = 38;
    let hdivisor = u32::from(divisor) << 16;
    let mut dvd = dividend;

    for _ in 0..15 {
        let temp = dvd;
        dvd <<= 1;

        if temp & 0x8000_0000 != 0 {
            dvd = dvd.wrapping_sub(hdivisor);
        } else {
            mcycles += 2;
            if dvd >= hdivisor {
                dvd = dvd.wrapping_sub(hdivisor);
                mcycles -= 1;
            }
        }
    }
    mcycles * 2
}

/// DIVS cycles, excluding EA time.
#[must_use]
pub fn divs(dividend: i32, divisor: i16) -> u32 {
    let mut mcycles: u32 = 6;
    if dividend < 0 {
        mcycles += 1;
    }

    let abs_dividend = dividend.unsigned_abs();
    let abs_divisor = u32::from(divisor.unsigned_abs());

    if (abs_dividend >> 16) >= abs_divisor {
        return (mcycles + 2) * 2;
    }

    let mut aquot = abs_dividend / abs_divisor;
    mcycles += 55;

    if divisor >= 0 {
        if dividend >= 0 {
            mcycles -= 1;
        } else {
            mcycles += 1;
        }
    }

    // Each zero among the 15 quotient MSBs costs one more mcycle.
    for _ in 0..15 {
        if (aquot as i16) >= 0 {
            mcycles += 1;
        }
        aquot <<= 1;
    }
    mcycles * 2
}
