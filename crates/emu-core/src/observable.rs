//! Read-only state inspection.
//!
//! Debuggers, tests and front ends query component state by dotted path.
//! Queries never affect emulation state.

use std::collections::BTreeMap;
use std::fmt;

/// A dynamically-typed value returned by a state query.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// 8-bit unsigned integer.
    U8(u8),
    /// 16-bit unsigned integer.
    U16(u16),
    /// 32-bit unsigned integer.
    U32(u32),
    /// 64-bit unsigned integer.
    U64(u64),
    /// Path-keyed values, in path order.
    Map(BTreeMap<String, Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v:#04X}"),
            Value::U16(v) => write!(f, "{v:#06X}"),
            Value::U32(v) => write!(f, "{v:#010X}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

/// A component whose state can be inspected.
pub trait Observable {
    /// Query a specific property by path, e.g. `pc`, `d0` or `flags.z`.
    ///
    /// Returns `None` if the path is not recognised.
    fn query(&self, path: &str) -> Option<Value>;

    /// All paths accepted by [`query`](Observable::query).
    fn query_paths(&self) -> &'static [&'static str];

    /// Every queryable value at once, keyed by path.
    fn snapshot(&self) -> Value {
        let map = self
            .query_paths()
            .iter()
            .filter_map(|&path| self.query(path).map(|v| (path.to_string(), v)))
            .collect();
        Value::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::{Observable, Value};

    struct Latch {
        level: u8,
        armed: bool,
    }

    impl Observable for Latch {
        fn query(&self, path: &str) -> Option<Value> {
            match path {
                "level" => Some(self.level.into()),
                "armed" => Some(self.armed.into()),
                _ => None,
            }
        }

        fn query_paths(&self) -> &'static [&'static str] {
            &["level", "armed"]
        }
    }

    #[test]
    fn snapshot_collects_every_path() {
        let latch = Latch { level: 3, armed: true };
        let Value::Map(map) = latch.snapshot() else {
            panic!("snapshot should be a map");
        };
        assert_eq!(map.len(), 2);
        assert_eq!(map["level"], Value::U8(3));
        assert_eq!(map["armed"], Value::Bool(true));
    }

    #[test]
    fn display_uses_hex_for_registers() {
        assert_eq!(Value::U16(0x2700).to_string(), "0x2700");
        assert_eq!(Value::U32(0x1000).to_string(), "0x00001000");
        assert_eq!(Value::U8(7).to_string(), "0x07");
    }
}
