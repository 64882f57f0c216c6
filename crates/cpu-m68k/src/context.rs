//! Whole-CPU snapshots.
//!
//! A [`Context`] carries everything that defines a CPU instance: registers,
//! cycle counter, interrupt lines, run state, memory map and hooks. Hosts
//! save and restore it as one value; several logical CPUs can share one
//! interpreter by swapping contexts.

use crate::cpu::RunState;
use crate::hooks::Hooks;
use crate::interrupts::InterruptLines;
use crate::memory::MemoryMap;
use crate::registers::Registers;

/// Opaque CPU state snapshot, obtained from
/// [`Cpu68000::get_context`](crate::Cpu68000::get_context).
#[derive(Debug, Clone)]
pub struct Context {
    pub(crate) regs: Registers,
    pub(crate) cycles_counter: u32,
    pub(crate) interrupts: InterruptLines,
    pub(crate) state: RunState,
    pub(crate) memory: MemoryMap,
    pub(crate) hooks: Hooks,
}

impl Context {
    #[must_use]
    pub const fn registers(&self) -> &Registers {
        &self.regs
    }

    #[must_use]
    pub const fn cycles_counter(&self) -> u32 {
        self.cycles_counter
    }

    #[must_use]
    pub const fn memory(&self) -> &MemoryMap {
        &self.memory
    }
}
