//! Region tables that route CPU accesses to host memory and devices.
//!
//! Each privilege level has an [`AddressSpaceMap`]: a list of fetch regions
//! serving program-space reads, plus separate read/write lists for byte and
//! word data accesses. A region is either a shared byte buffer (big-endian,
//! offset from the region's low address) or a host callback. Lists are
//! searched in insertion order and the first range containing the address
//! wins.
//!
//! The 68000 bus is 16 bits wide: long accesses are performed by the
//! interpreter as two word accesses, high word first.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::config::{CpuConfig, UnmappedPolicy};

/// Byte buffer shared between the host and the CPU's region tables.
pub type SharedRam = Rc<RefCell<Vec<u8>>>;

pub type ReadByteFn = Rc<dyn Fn(u32) -> u8>;
pub type ReadWordFn = Rc<dyn Fn(u32) -> u16>;
pub type WriteByteFn = Rc<dyn Fn(u32, u8)>;
pub type WriteWordFn = Rc<dyn Fn(u32, u16)>;

/// Allocate a zeroed shared buffer.
#[must_use]
pub fn shared_ram(len: usize) -> SharedRam {
    Rc::new(RefCell::new(vec![0; len]))
}

/// The four address spaces selected by the function code pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressSpace {
    /// FC=6.
    SupervisorProgram,
    /// FC=5.
    SupervisorData,
    /// FC=2.
    UserProgram,
    /// FC=1.
    UserData,
}

impl AddressSpace {
    #[must_use]
    pub const fn from_flags(supervisor: bool, program: bool) -> Self {
        match (supervisor, program) {
            (true, true) => Self::SupervisorProgram,
            (true, false) => Self::SupervisorData,
            (false, true) => Self::UserProgram,
            (false, false) => Self::UserData,
        }
    }

    /// Decode the host encoding: privilege (supervisor 0, user 2) plus
    /// kind (program 0, data 1).
    #[must_use]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::SupervisorProgram),
            1 => Some(Self::SupervisorData),
            2 => Some(Self::UserProgram),
            3 => Some(Self::UserData),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_supervisor(self) -> bool {
        matches!(self, Self::SupervisorProgram | Self::SupervisorData)
    }

    #[must_use]
    pub const fn is_program(self) -> bool {
        matches!(self, Self::SupervisorProgram | Self::UserProgram)
    }

    /// Three-bit FC value, as stored in group 0 exception frames.
    #[must_use]
    pub const fn function_code(self) -> u8 {
        match self {
            Self::UserData => 1,
            Self::UserProgram => 2,
            Self::SupervisorData => 5,
            Self::SupervisorProgram => 6,
        }
    }
}

/// A failed access: no region claimed the address and the unmapped policy
/// is [`UnmappedPolicy::BusError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault {
    pub address: u32,
    pub space: AddressSpace,
    pub write: bool,
}

/// Program-space region backed by a byte buffer.
#[derive(Clone)]
pub struct FetchRegion {
    pub low: u32,
    pub high: u32,
    pub data: SharedRam,
}

/// What a data region dispatches to.
#[derive(Clone)]
pub enum Backing<H> {
    Memory(SharedRam),
    Handler(H),
}

/// Data region for one access width and direction.
#[derive(Clone)]
pub struct Region<H> {
    pub low: u32,
    pub high: u32,
    pub backing: Backing<H>,
}

impl<H> Region<H> {
    #[must_use]
    pub const fn memory(low: u32, high: u32, data: SharedRam) -> Self {
        Self { low, high, backing: Backing::Memory(data) }
    }

    #[must_use]
    pub const fn handler(low: u32, high: u32, handler: H) -> Self {
        Self { low, high, backing: Backing::Handler(handler) }
    }

    const fn contains(&self, address: u32) -> bool {
        self.low <= address && address <= self.high
    }
}

fn find<H>(regions: &[Region<H>], address: u32) -> Option<&Region<H>> {
    regions.iter().find(|r| r.contains(address))
}

fn buffer_byte(data: &SharedRam, offset: u32) -> Option<u8> {
    data.borrow().get(offset as usize).copied()
}

fn buffer_word(data: &SharedRam, offset: u32) -> Option<u16> {
    let buf = data.borrow();
    let i = offset as usize;
    let hi = *buf.get(i)?;
    let lo = *buf.get(i + 1)?;
    Some(u16::from_be_bytes([hi, lo]))
}

fn store_byte(data: &SharedRam, offset: u32, value: u8) -> bool {
    match data.borrow_mut().get_mut(offset as usize) {
        Some(slot) => {
            *slot = value;
            true
        }
        None => false,
    }
}

fn store_word(data: &SharedRam, offset: u32, value: u16) -> bool {
    let mut buf = data.borrow_mut();
    let i = offset as usize;
    match buf.get_mut(i..i + 2) {
        Some(slot) => {
            slot.copy_from_slice(&value.to_be_bytes());
            true
        }
        None => false,
    }
}

/// Region tables for one privilege level.
#[derive(Clone, Default)]
pub struct AddressSpaceMap {
    pub fetch: Vec<FetchRegion>,
    pub read_byte: Vec<Region<ReadByteFn>>,
    pub read_word: Vec<Region<ReadWordFn>>,
    pub write_byte: Vec<Region<WriteByteFn>>,
    pub write_word: Vec<Region<WriteWordFn>>,
}

impl AddressSpaceMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Readable, writable and executable buffer covering `low..=high`.
    pub fn map_ram(&mut self, low: u32, high: u32, ram: &SharedRam) -> &mut Self {
        self.map_rom(low, high, ram);
        self.write_byte.push(Region::memory(low, high, Rc::clone(ram)));
        self.write_word.push(Region::memory(low, high, Rc::clone(ram)));
        self
    }

    /// Readable and executable buffer; writes fall through to later regions.
    pub fn map_rom(&mut self, low: u32, high: u32, rom: &SharedRam) -> &mut Self {
        self.fetch.push(FetchRegion { low, high, data: Rc::clone(rom) });
        self.read_byte.push(Region::memory(low, high, Rc::clone(rom)));
        self.read_word.push(Region::memory(low, high, Rc::clone(rom)));
        self
    }

    /// Device registers: all data accesses in `low..=high` go to callbacks.
    /// Callbacks receive the full (masked) address.
    pub fn map_io(
        &mut self,
        low: u32,
        high: u32,
        read_byte: ReadByteFn,
        read_word: ReadWordFn,
        write_byte: WriteByteFn,
        write_word: WriteWordFn,
    ) -> &mut Self {
        self.read_byte.push(Region::handler(low, high, read_byte));
        self.read_word.push(Region::handler(low, high, read_word));
        self.write_byte.push(Region::handler(low, high, write_byte));
        self.write_word.push(Region::handler(low, high, write_word));
        self
    }

    fn fetch_word(&self, address: u32) -> Option<u16> {
        let region = self
            .fetch
            .iter()
            .find(|r| r.low <= address && address <= r.high)?;
        buffer_word(&region.data, address - region.low)
    }

    fn fetch_byte(&self, address: u32) -> Option<u8> {
        let region = self
            .fetch
            .iter()
            .find(|r| r.low <= address && address <= r.high)?;
        buffer_byte(&region.data, address - region.low)
    }

    fn data_byte(&self, address: u32) -> Option<u8> {
        let region = find(&self.read_byte, address)?;
        match &region.backing {
            Backing::Memory(data) => buffer_byte(data, address - region.low),
            Backing::Handler(read) => Some(read(address)),
        }
    }

    fn data_word(&self, address: u32) -> Option<u16> {
        let region = find(&self.read_word, address)?;
        match &region.backing {
            Backing::Memory(data) => buffer_word(data, address - region.low),
            Backing::Handler(read) => Some(read(address)),
        }
    }

    fn put_byte(&self, address: u32, value: u8) -> bool {
        let Some(region) = find(&self.write_byte, address) else {
            return false;
        };
        match &region.backing {
            Backing::Memory(data) => store_byte(data, address - region.low, value),
            Backing::Handler(write) => {
                write(address, value);
                true
            }
        }
    }

    fn put_word(&self, address: u32, value: u16) -> bool {
        let Some(region) = find(&self.write_word, address) else {
            return false;
        };
        match &region.backing {
            Backing::Memory(data) => store_word(data, address - region.low, value),
            Backing::Handler(write) => {
                write(address, value);
                true
            }
        }
    }
}

impl fmt::Debug for AddressSpaceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressSpaceMap")
            .field("fetch", &self.fetch.len())
            .field("read_byte", &self.read_byte.len())
            .field("read_word", &self.read_word.len())
            .field("write_byte", &self.write_byte.len())
            .field("write_word", &self.write_word.len())
            .finish()
    }
}

/// Complete memory map: supervisor and user tables plus the policy for
/// addresses neither covers.
#[derive(Debug, Clone)]
pub struct MemoryMap {
    pub supervisor: AddressSpaceMap,
    pub user: AddressSpaceMap,
    pub unmapped: UnmappedPolicy,
    pub address_mask: u32,
}

impl Default for MemoryMap {
    fn default() -> Self {
        Self::new(&CpuConfig::default())
    }
}

impl MemoryMap {
    #[must_use]
    pub fn new(config: &CpuConfig) -> Self {
        Self {
            supervisor: AddressSpaceMap::new(),
            user: AddressSpaceMap::new(),
            unmapped: config.unmapped,
            address_mask: config.address_mask,
        }
    }

    /// Map the same RAM into both privilege levels.
    pub fn map_ram(&mut self, low: u32, high: u32, ram: &SharedRam) -> &mut Self {
        self.supervisor.map_ram(low, high, ram);
        self.user.map_ram(low, high, ram);
        self
    }

    const fn table(&self, space: AddressSpace) -> &AddressSpaceMap {
        if space.is_supervisor() { &self.supervisor } else { &self.user }
    }

    fn miss<T>(&self, address: u32, space: AddressSpace, write: bool, open: T) -> Result<T, BusFault> {
        match self.unmapped {
            UnmappedPolicy::BusError => Err(BusFault { address, space, write }),
            UnmappedPolicy::OpenBus { .. } => Ok(open),
        }
    }

    const fn fill(&self) -> u8 {
        match self.unmapped {
            UnmappedPolicy::BusError => 0,
            UnmappedPolicy::OpenBus { fill } => fill,
        }
    }

    /// Read a byte. Program-space reads go through the fetch regions.
    pub fn read_byte(&self, address: u32, space: AddressSpace) -> Result<u8, BusFault> {
        let address = address & self.address_mask;
        let table = self.table(space);
        let value = if space.is_program() {
            table.fetch_byte(address)
        } else {
            table.data_byte(address)
        };
        match value {
            Some(v) => Ok(v),
            None => self.miss(address, space, false, self.fill()),
        }
    }

    /// Read a word. The caller has already checked alignment.
    pub fn read_word(&self, address: u32, space: AddressSpace) -> Result<u16, BusFault> {
        match self.peek_word(address, space) {
            Some(v) => Ok(v),
            None => {
                let fill = u16::from(self.fill());
                self.miss(address & self.address_mask, space, false, (fill << 8) | fill)
            }
        }
    }

    /// Word from a mapped region, or `None`. The unmapped policy does not
    /// apply here.
    #[must_use]
    pub fn peek_word(&self, address: u32, space: AddressSpace) -> Option<u16> {
        let address = address & self.address_mask;
        let table = self.table(space);
        if space.is_program() {
            table.fetch_word(address)
        } else {
            table.data_word(address)
        }
    }

    /// Long from mapped regions only.
    #[must_use]
    pub fn peek_long(&self, address: u32, space: AddressSpace) -> Option<u32> {
        let hi = self.peek_word(address, space)?;
        let lo = self.peek_word(address.wrapping_add(2), space)?;
        Some((u32::from(hi) << 16) | u32::from(lo))
    }

    pub fn write_byte(&self, address: u32, space: AddressSpace, value: u8) -> Result<(), BusFault> {
        let address = address & self.address_mask;
        if self.table(space).put_byte(address, value) {
            Ok(())
        } else {
            self.miss(address, space, true, ())
        }
    }

    pub fn write_word(&self, address: u32, space: AddressSpace, value: u16) -> Result<(), BusFault> {
        let address = address & self.address_mask;
        if self.table(space).put_word(address, value) {
            Ok(())
        } else {
            self.miss(address, space, true, ())
        }
    }

    /// Two word reads, high word first.
    pub fn read_long(&self, address: u32, space: AddressSpace) -> Result<u32, BusFault> {
        let hi = self.read_word(address, space)?;
        let lo = self.read_word(address.wrapping_add(2), space)?;
        Ok((u32::from(hi) << 16) | u32::from(lo))
    }

    /// Two word writes, high word first.
    pub fn write_long(&self, address: u32, space: AddressSpace, value: u32) -> Result<(), BusFault> {
        self.write_word(address, space, (value >> 16) as u16)?;
        self.write_word(address.wrapping_add(2), space, value as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn raw_space_encoding() {
        assert_eq!(AddressSpace::from_raw(0), Some(AddressSpace::SupervisorProgram));
        assert_eq!(AddressSpace::from_raw(1), Some(AddressSpace::SupervisorData));
        assert_eq!(AddressSpace::from_raw(2), Some(AddressSpace::UserProgram));
        assert_eq!(AddressSpace::from_raw(3), Some(AddressSpace::UserData));
        assert_eq!(AddressSpace::from_raw(4), None);
        assert_eq!(AddressSpace::SupervisorProgram.function_code(), 6);
    }

    #[test]
    fn ram_is_big_endian_and_offset_from_low() {
        let ram = shared_ram(0x100);
        let mut map = MemoryMap::default();
        map.map_ram(0x1000, 0x10FF, &ram);

        map.write_long(0x1010, AddressSpace::SupervisorData, 0x1234_5678).unwrap();
        assert_eq!(ram.borrow()[0x10..0x14], [0x12, 0x34, 0x56, 0x78]);
        assert_eq!(map.read_word(0x1012, AddressSpace::UserData), Ok(0x5678));
        assert_eq!(map.read_byte(0x1011, AddressSpace::SupervisorProgram), Ok(0x34));
    }

    #[test]
    fn first_matching_region_wins() {
        let low = shared_ram(0x10);
        let high = shared_ram(0x10);
        low.borrow_mut()[0] = 0xAA;
        high.borrow_mut()[0] = 0xBB;

        let mut map = MemoryMap::default();
        map.supervisor.map_rom(0, 0xF, &low).map_rom(0, 0xF, &high);
        assert_eq!(map.read_byte(0, AddressSpace::SupervisorData), Ok(0xAA));
    }

    #[test]
    fn handlers_see_the_full_address() {
        let seen = Rc::new(Cell::new(0u32));
        let log = Rc::clone(&seen);
        let mut map = MemoryMap::default();
        map.supervisor.map_io(
            0xBF_E000,
            0xBF_EFFF,
            Rc::new(|a: u32| (a & 0xFF) as u8),
            Rc::new(|a: u32| a as u16),
            Rc::new(move |a: u32, _: u8| log.set(a)),
            Rc::new(|_: u32, _: u16| {}),
        );
        assert_eq!(map.read_byte(0xBF_E0C1, AddressSpace::SupervisorData), Ok(0xC1));
        map.write_byte(0xBF_E201, AddressSpace::SupervisorData, 3).unwrap();
        assert_eq!(seen.get(), 0xBF_E201);
        // User tables are separate.
        assert!(map.read_byte(0xBF_E0C1, AddressSpace::UserData).is_err());
    }

    #[test]
    fn unmapped_access_follows_policy() {
        let map = MemoryMap::default();
        assert_eq!(
            map.read_word(0x40_0000, AddressSpace::SupervisorData),
            Err(BusFault { address: 0x40_0000, space: AddressSpace::SupervisorData, write: false })
        );

        let open = MemoryMap::new(&CpuConfig {
            unmapped: UnmappedPolicy::OpenBus { fill: 0xFF },
            ..CpuConfig::default()
        });
        assert_eq!(open.read_word(0x40_0000, AddressSpace::UserData), Ok(0xFFFF));
        assert_eq!(open.write_byte(0x40_0000, AddressSpace::UserData, 1), Ok(()));
        assert_eq!(open.peek_word(0x40_0000, AddressSpace::UserData), None);
        assert_eq!(open.peek_long(0, AddressSpace::SupervisorProgram), None);
    }

    #[test]
    fn short_buffer_is_a_miss_not_a_panic() {
        let ram = shared_ram(4);
        let mut map = MemoryMap::default();
        map.map_ram(0, 0xFFFF, &ram);
        assert!(map.read_word(3, AddressSpace::SupervisorData).is_err());
        assert!(map.write_word(8, AddressSpace::SupervisorData, 0).is_err());
    }

    #[test]
    fn rom_rejects_writes_and_address_is_masked() {
        let rom = shared_ram(4);
        rom.borrow_mut()[2] = 0x4E;
        let mut map = MemoryMap::default();
        map.supervisor.map_rom(0, 3, &rom);
        assert_eq!(map.read_byte(0xFF00_0002, AddressSpace::SupervisorProgram), Ok(0x4E));
        assert!(map.write_byte(2, AddressSpace::SupervisorData, 0).is_err());
    }
}
