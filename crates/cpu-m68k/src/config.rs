//! CPU construction options.

/// What happens when an access hits no registered region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmappedPolicy {
    /// Raise a bus error exception (vector 2).
    #[default]
    BusError,
    /// Reads return `fill` in every byte lane; writes are dropped.
    OpenBus { fill: u8 },
}

/// Options fixed at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuConfig {
    /// Mask applied to every address before region lookup. The 68000 drives
    /// 24 address lines.
    pub address_mask: u32,
    pub unmapped: UnmappedPolicy,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            address_mask: 0x00FF_FFFF,
            unmapped: UnmappedPolicy::BusError,
        }
    }
}
