//! Motorola 68000 interpreter with table-exact cycle accounting.
//!
//! The core executes one instruction at a time against a [`MemoryMap`] of
//! host-supplied regions, charging each instruction its documented cycle
//! cost. Hosts drive it through [`Cpu68000::emulate`] (or the
//! [`emu_core::Timesliced`] trait), raise interrupts with
//! [`Cpu68000::raise_irq`], and can save or restore the whole processor
//! through a [`Context`].
//!
//! Exceptions are taken at instruction boundaries. Bus and address errors
//! build the long group 0 frame; a fault while building any frame halts
//! the processor.

pub mod addressing;
pub mod alu;
pub mod config;
pub mod context;
pub mod cpu;
pub mod error;
pub mod flags;
pub mod hooks;
pub mod interrupts;
pub mod memory;
pub mod registers;

mod arith;
mod branches;
mod decode;
mod ea;
mod exceptions;
mod execute;
mod immediates;
mod logic;
mod misc;
mod shifts;
mod timing;

pub use addressing::AddrMode;
pub use alu::Size;
pub use config::{CpuConfig, UnmappedPolicy};
pub use context::Context;
pub use cpu::{Cpu68000, RunState};
pub use error::M68kError;
pub use exceptions::vector;
pub use flags::{Status, C, N, S, T, V, X, Z};
pub use hooks::{CpuControl, Hooks};
pub use interrupts::{InterruptLines, IrqVector, AUTOVECTORED, SPURIOUS};
pub use memory::{
    shared_ram, AddressSpace, AddressSpaceMap, Backing, FetchRegion, MemoryMap, Region, SharedRam,
};
pub use registers::{Register, Registers};
