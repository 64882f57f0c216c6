//! Interrupt request lines.
//!
//! Seven priority levels (1 lowest, 7 highest), each with a pending flag
//! and the vector it will be acknowledged with. Level 0 means "no request"
//! and is never stored.

use crate::error::M68kError;

/// Raw host value for an autovectored request.
pub const AUTOVECTORED: i32 = -1;
/// Raw host value for a spurious request.
pub const SPURIOUS: i32 = -2;

/// First autovector slot; level `n` uses `AUTOVECTOR_BASE + n`.
pub const AUTOVECTOR_BASE: u8 = 24;
/// Vector taken when no device answers the acknowledge cycle.
pub const SPURIOUS_VECTOR: u8 = 24;

/// How a request is acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IrqVector {
    /// Use the level's autovector (25-31).
    #[default]
    Autovectored,
    /// Use the spurious interrupt vector (24).
    Spurious,
    /// Device-supplied vector number.
    Vector(u8),
}

impl IrqVector {
    /// Decode the host encoding: 0-255 is a vector number, `-1` autovector,
    /// `-2` spurious.
    pub fn from_raw(raw: i32) -> Result<Self, M68kError> {
        match raw {
            AUTOVECTORED => Ok(Self::Autovectored),
            SPURIOUS => Ok(Self::Spurious),
            _ => u8::try_from(raw)
                .map(Self::Vector)
                .map_err(|_| M68kError::InvalidIrqVector(raw)),
        }
    }

    #[must_use]
    pub fn raw(self) -> i32 {
        match self {
            Self::Autovectored => AUTOVECTORED,
            Self::Spurious => SPURIOUS,
            Self::Vector(v) => i32::from(v),
        }
    }

    /// Vector number taken when this request is accepted at `level`.
    #[must_use]
    pub const fn resolve(self, level: u8) -> u8 {
        match self {
            Self::Autovectored => AUTOVECTOR_BASE + level,
            Self::Spurious => SPURIOUS_VECTOR,
            Self::Vector(v) => v,
        }
    }
}

/// Pending requests and their vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterruptLines {
    /// Bit `n` set when level `n` is requesting.
    pending: u8,
    vectors: [IrqVector; 8],
}

fn check_level(level: u8) -> Result<usize, M68kError> {
    if (1..=7).contains(&level) {
        Ok(usize::from(level))
    } else {
        Err(M68kError::IrqLevel(i32::from(level)))
    }
}

impl InterruptLines {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assert `level` with `vector`.
    ///
    /// Returns the vector of a request that was already pending at this
    /// level (it is replaced), or `None`.
    pub fn raise(&mut self, level: u8, vector: IrqVector) -> Result<Option<IrqVector>, M68kError> {
        let i = check_level(level)?;
        let previous = self.is_pending(level).then_some(self.vectors[i]);
        self.pending |= 1 << level;
        self.vectors[i] = vector;
        Ok(previous)
    }

    /// Withdraw a request. Lowering an idle level is not an error.
    pub fn lower(&mut self, level: u8) -> Result<(), M68kError> {
        check_level(level)?;
        self.pending &= !(1 << level);
        Ok(())
    }

    /// Vector currently assigned to `level`, pending or not.
    pub fn vector(&self, level: u8) -> Result<IrqVector, M68kError> {
        Ok(self.vectors[check_level(level)?])
    }

    /// Reassign the vector of `level` without touching its pending flag.
    pub fn change_vector(&mut self, level: u8, vector: IrqVector) -> Result<(), M68kError> {
        let i = check_level(level)?;
        self.vectors[i] = vector;
        Ok(())
    }

    #[must_use]
    pub const fn is_pending(&self, level: u8) -> bool {
        level < 8 && self.pending & (1 << level) != 0
    }

    /// Highest pending level above `mask`, if any.
    #[must_use]
    pub fn acceptable(&self, mask: u8) -> Option<u8> {
        (mask.saturating_add(1)..=7).rev().find(|&level| self.is_pending(level))
    }

    /// Clear the pending flag of an accepted level and return its vector.
    pub(crate) fn acknowledge(&mut self, level: u8) -> IrqVector {
        let i = usize::from(level & 7);
        self.pending &= !(1 << (level & 7));
        self.vectors[i]
    }

    /// Drop every request (RESET).
    pub fn clear(&mut self) {
        self.pending = 0;
    }
}
