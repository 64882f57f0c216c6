//! Host-visible parameter errors.
//!
//! Emulated CPU exceptions (bus error, illegal instruction, ...) are not
//! errors in this sense; they are handled inside the interpreter.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum M68kError {
    /// Register identifier outside `D0..=SR`.
    InvalidRegister(u32),
    /// Interrupt level outside `1..=7`.
    IrqLevel(i32),
    /// Vector that is neither a vector number nor an autovector/spurious
    /// sentinel.
    InvalidIrqVector(i32),
    /// The reset vector is not backed by any supervisor program region.
    NoSupervisorAddressSpace,
}

impl M68kError {
    /// Numeric sentinel for hosts that speak the integer status protocol.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::InvalidRegister(_) | Self::IrqLevel(_) => -1,
            Self::InvalidIrqVector(_) => -2,
            Self::NoSupervisorAddressSpace => 2,
        }
    }
}

impl fmt::Display for M68kError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRegister(id) => write!(f, "invalid register identifier {id}"),
            Self::IrqLevel(level) => write!(f, "interrupt level {level} outside 1..=7"),
            Self::InvalidIrqVector(vector) => write!(f, "invalid interrupt vector {vector}"),
            Self::NoSupervisorAddressSpace => {
                write!(f, "reset vector is not mapped in supervisor program space")
            }
        }
    }
}

impl std::error::Error for M68kError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_host_protocol() {
        assert_eq!(M68kError::InvalidRegister(99).code(), -1);
        assert_eq!(M68kError::IrqLevel(8).code(), -1);
        assert_eq!(M68kError::InvalidIrqVector(300).code(), -2);
        assert_eq!(M68kError::NoSupervisorAddressSpace.code(), 2);
    }

    #[test]
    fn display_names_the_bad_value() {
        assert_eq!(
            M68kError::IrqLevel(0).to_string(),
            "interrupt level 0 outside 1..=7"
        );
    }
}
