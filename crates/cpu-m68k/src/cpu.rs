//! The 68000 interpreter and its host-facing timing façade.
//!
//! The host builds a [`MemoryMap`], optionally installs [`Hooks`], resets
//! the CPU and then hands it cycle budgets through [`Cpu68000::emulate`].
//! Each budget is spent one whole instruction at a time: interrupts, stop
//! requests and cycle adjustments are only looked at between instructions,
//! and the last instruction of a slice may run past the budget.

use emu_core::{Observable, Ticks, Timesliced, Value};
use log::{debug, warn};

use crate::alu::Size;
use crate::config::CpuConfig;
use crate::context::Context;
use crate::error::M68kError;
use crate::exceptions::{AccessFault, Exception};
use crate::flags::{C, N, V, X, Z};
use crate::hooks::{CpuControl, Hooks};
use crate::interrupts::{InterruptLines, IrqVector};
use crate::memory::{AddressSpace, BusFault, MemoryMap};
use crate::registers::{Register, Registers};

/// Execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Built but never reset. Nothing runs and no interrupt is accepted
    /// until [`Cpu68000::reset`] succeeds.
    #[default]
    PoweredOn,
    /// Executing instructions.
    Running,
    /// STOP executed; waiting for an interrupt above the mask.
    Stopped,
    /// Double fault. Only [`Cpu68000::reset`] recovers.
    Halted,
}

/// Motorola 68000 CPU.
#[derive(Debug)]
pub struct Cpu68000 {
    pub regs: Registers,
    pub(crate) memory: MemoryMap,
    pub(crate) hooks: Hooks,
    pub(crate) irq: InterruptLines,
    pub(crate) state: RunState,
    /// Cycles executed since the counter was last tripped.
    cycles: u32,
    control: CpuControl,
    total_cycles: Ticks,

    /// Opcode of the instruction being executed.
    pub(crate) opcode: u16,
    /// Address of that opcode.
    pub(crate) instr_pc: u32,
    /// Set while stacking an exception frame; recorded in group 0 frames.
    pub(crate) exception_processing: bool,
}

impl Default for Cpu68000 {
    fn default() -> Self {
        Self::new(CpuConfig::default())
    }
}

impl Cpu68000 {
    /// A CPU with an empty memory map. Call [`load_memory`](Self::load_memory)
    /// and [`reset`](Self::reset) before running it.
    #[must_use]
    pub fn new(config: CpuConfig) -> Self {
        Self {
            regs: Registers::new(),
            memory: MemoryMap::new(&config),
            hooks: Hooks::new(),
            irq: InterruptLines::new(),
            state: RunState::PoweredOn,
            cycles: 0,
            control: CpuControl::new(),
            total_cycles: Ticks::ZERO,
            opcode: 0,
            instr_pc: 0,
            exception_processing: false,
        }
    }

    /// Replace the region tables wholesale.
    pub fn load_memory(&mut self, memory: MemoryMap) {
        self.memory = memory;
    }

    #[must_use]
    pub const fn memory(&self) -> &MemoryMap {
        &self.memory
    }

    /// Replace every callback slot.
    pub fn set_hooks(&mut self, hooks: Hooks) {
        self.hooks = hooks;
    }

    #[must_use]
    pub const fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Handle for callbacks that need to steer the run loop.
    #[must_use]
    pub fn control(&self) -> CpuControl {
        self.control.clone()
    }

    /// Hardware reset: load SSP and PC from vectors 0 and 1, enter
    /// supervisor mode with interrupts masked, drop pending requests.
    ///
    /// Fails without touching any state unless both vectors sit in a
    /// supervisor program region. Open-bus fill does not count as mapped.
    pub fn reset(&mut self) -> Result<(), M68kError> {
        let space = AddressSpace::SupervisorProgram;
        let (Some(ssp), Some(pc)) = (self.memory.peek_long(0, space), self.memory.peek_long(4, space)) else {
            warn!("reset vector is not mapped in supervisor program space");
            return Err(M68kError::NoSupervisorAddressSpace);
        };

        self.regs = Registers::new();
        self.regs.a[7] = ssp;
        self.regs.pc = pc;
        self.irq.clear();
        self.state = RunState::Running;
        self.control.resume();
        self.opcode = 0;
        self.instr_pc = pc;
        debug!("reset: SSP={ssp:08X} PC={pc:08X}");
        Ok(())
    }

    // === Timing façade ===

    /// Run for `clocks` cycles and return the number actually consumed.
    ///
    /// The final instruction may overrun the budget. A stopped or halted
    /// CPU idles away whatever budget is left; a CPU that was never reset
    /// consumes nothing. A [`stop_emulating`](Self::stop_emulating) request
    /// ends this call and is then cleared.
    pub fn emulate(&mut self, clocks: u32) -> u32 {
        let budget = i64::from(clocks);
        let mut consumed = 0i64;

        while consumed < budget {
            if self.control.is_stopped() {
                break;
            }
            let idle = match self.state {
                RunState::PoweredOn => break,
                RunState::Halted => true,
                RunState::Stopped => self.irq.acceptable(self.regs.interrupt_mask()).is_none(),
                RunState::Running => false,
            };
            if idle {
                consumed += self.charge(budget - consumed);
                break;
            }

            consumed += i64::from(self.step());
            consumed += self.charge(self.control.take_adjustment());

            if self.control.take_release() {
                break;
            }
        }
        self.control.resume();
        u32::try_from(consumed.max(0)).unwrap_or(u32::MAX)
    }

    /// Execute one instruction, or accept one interrupt, and return its
    /// cost. Returns 0 when halted, never reset, or stopped with nothing
    /// to accept.
    pub fn step(&mut self) -> u32 {
        let cost = if matches!(self.state, RunState::Halted | RunState::PoweredOn) {
            0
        } else if let Some(level) = self.irq.acceptable(self.regs.interrupt_mask()) {
            self.take_interrupt(level)
        } else if self.state == RunState::Running {
            self.execute_one()
        } else {
            0
        };
        self.charge(i64::from(cost));
        cost
    }

    fn execute_one(&mut self) -> u32 {
        let tracing = self.regs.is_trace();
        self.instr_pc = self.regs.pc;
        let result = match self.fetch_word() {
            Ok(op) => {
                self.opcode = op;
                self.execute(op)
            }
            Err(exception) => Err(exception),
        };
        match result {
            Ok(cycles) if tracing && self.state == RunState::Running => cycles + self.take_trace(),
            Ok(cycles) => cycles,
            Err(exception) => self.take_exception(exception),
        }
    }

    /// Apply a cycle adjustment and return the part that took effect.
    /// Releases are capped at what the counter holds.
    fn charge(&mut self, cycles: i64) -> i64 {
        if cycles >= 0 {
            let added = u32::try_from(cycles).unwrap_or(u32::MAX);
            self.cycles = self.cycles.wrapping_add(added);
            self.total_cycles += Ticks::from(added);
            i64::from(added)
        } else {
            let released = u32::try_from(cycles.unsigned_abs()).unwrap_or(u32::MAX).min(self.cycles);
            self.cycles -= released;
            self.total_cycles -= Ticks::from(released);
            -i64::from(released)
        }
    }

    /// Cycles executed since the counter was last tripped.
    #[must_use]
    pub const fn cycles_counter(&self) -> u32 {
        self.cycles
    }

    /// Read and clear the cycle counter.
    pub fn trip_cycles_counter(&mut self) -> u32 {
        core::mem::take(&mut self.cycles)
    }

    /// With `clocks == 0`, trip the counter and return its old value.
    /// Otherwise charge `clocks` extra cycles and return the new value.
    pub fn control_cycles_counter(&mut self, clocks: u32) -> u32 {
        if clocks == 0 {
            self.trip_cycles_counter()
        } else {
            self.add_cycles(clocks);
            self.cycles
        }
    }

    /// Charge cycles without executing anything (DMA stalls, wait states).
    pub fn add_cycles(&mut self, clocks: u32) {
        self.charge(i64::from(clocks));
    }

    /// Give cycles back, at most down to an empty counter.
    pub fn release_cycles(&mut self, clocks: u32) {
        self.charge(-i64::from(clocks));
    }

    /// Make the current (or next) `emulate` call return after one more
    /// instruction.
    pub fn release_timeslice(&self) {
        self.control.release_timeslice();
    }

    /// End the current `emulate` call at the next instruction boundary.
    /// Made outside `emulate`, the request makes the next call return
    /// without running anything. Either way it is cleared on return.
    pub fn stop_emulating(&self) {
        self.control.stop_emulating();
    }

    /// Cycles since construction, including idle time and adjustments.
    #[must_use]
    pub const fn total_cycles(&self) -> Ticks {
        self.total_cycles
    }

    // === Accessors ===

    #[must_use]
    pub const fn get_pc(&self) -> u32 {
        self.regs.pc
    }

    #[must_use]
    pub const fn cpu_state(&self) -> RunState {
        self.state
    }

    #[must_use]
    pub const fn is_halted(&self) -> bool {
        matches!(self.state, RunState::Halted)
    }

    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        matches!(self.state, RunState::Stopped)
    }

    #[must_use]
    pub fn get_register(&self, reg: Register) -> u32 {
        self.regs.get(reg)
    }

    pub fn set_register(&mut self, reg: Register, value: u32) {
        self.regs.set(reg, value);
    }

    /// Debug read of one word, outside normal execution and timing.
    /// Program spaces read the fetch regions. `None` when unmapped,
    /// whatever the unmapped policy.
    #[must_use]
    pub fn fetch(&self, address: u32, space: AddressSpace) -> Option<u16> {
        self.memory.peek_word(address, space)
    }

    // === Interrupt lines ===

    /// Assert `level` (1-7). Returns the vector of a request already
    /// pending at that level.
    pub fn raise_irq(&mut self, level: u8, vector: IrqVector) -> Result<Option<IrqVector>, M68kError> {
        self.irq.raise(level, vector)
    }

    pub fn lower_irq(&mut self, level: u8) -> Result<(), M68kError> {
        self.irq.lower(level)
    }

    pub fn get_irq_vector(&self, level: u8) -> Result<IrqVector, M68kError> {
        self.irq.vector(level)
    }

    pub fn change_irq_vector(&mut self, level: u8, vector: IrqVector) -> Result<(), M68kError> {
        self.irq.change_vector(level, vector)
    }

    // === Context ===

    /// Snapshot the complete CPU state, including the memory map.
    #[must_use]
    pub fn get_context(&self) -> Context {
        Context {
            regs: self.regs,
            cycles_counter: self.cycles,
            interrupts: self.irq,
            state: self.state,
            memory: self.memory.clone(),
            hooks: self.hooks.clone(),
        }
    }

    /// Replace the complete CPU state.
    pub fn set_context(&mut self, context: &Context) {
        self.regs = context.regs;
        self.cycles = context.cycles_counter;
        self.irq = context.interrupts;
        self.state = context.state;
        self.memory = context.memory.clone();
        self.hooks = context.hooks.clone();
        debug!("context loaded: PC={:08X} SR={:04X}", self.regs.pc, self.regs.sr());
    }

    /// Size of the value returned by [`get_context`](Self::get_context).
    #[must_use]
    pub const fn get_context_size() -> usize {
        core::mem::size_of::<Context>()
    }

    // === Bus access used by the instruction handlers ===

    pub(crate) const fn data_space(&self) -> AddressSpace {
        AddressSpace::from_flags(self.regs.is_supervisor(), false)
    }

    pub(crate) const fn program_space(&self) -> AddressSpace {
        AddressSpace::from_flags(self.regs.is_supervisor(), true)
    }

    const fn fault(&self, address: u32, space: AddressSpace, write: bool) -> AccessFault {
        AccessFault {
            address,
            space,
            write,
            instruction: !self.exception_processing,
        }
    }

    fn bus_error(&self, fault: BusFault) -> Exception {
        Exception::BusError(self.fault(fault.address, fault.space, fault.write))
    }

    fn check_alignment(&self, address: u32, size: Size, space: AddressSpace, write: bool) -> Result<(), Exception> {
        if size != Size::Byte && address & 1 != 0 {
            Err(Exception::AddressError(self.fault(address, space, write)))
        } else {
            Ok(())
        }
    }

    /// Read from any space. Word and long reads must be even.
    pub(crate) fn read_space(&self, address: u32, size: Size, space: AddressSpace) -> Result<u32, Exception> {
        self.check_alignment(address, size, space, false)?;
        let value = match size {
            Size::Byte => self.memory.read_byte(address, space).map(u32::from),
            Size::Word => self.memory.read_word(address, space).map(u32::from),
            Size::Long => self.memory.read_long(address, space),
        };
        value.map_err(|f| self.bus_error(f))
    }

    /// Read from the current data space.
    pub(crate) fn read_data(&self, address: u32, size: Size) -> Result<u32, Exception> {
        self.read_space(address, size, self.data_space())
    }

    /// Write to the current data space. Word and long writes must be even.
    pub(crate) fn write_data(&self, address: u32, size: Size, value: u32) -> Result<(), Exception> {
        let space = self.data_space();
        self.check_alignment(address, size, space, true)?;
        let result = match size {
            Size::Byte => self.memory.write_byte(address, space, value as u8),
            Size::Word => self.memory.write_word(address, space, value as u16),
            Size::Long => self.memory.write_long(address, space, value),
        };
        result.map_err(|f| self.bus_error(f))
    }

    /// Fetch the word at PC from program space and advance PC.
    pub(crate) fn fetch_word(&mut self) -> Result<u16, Exception> {
        let value = self.read_space(self.regs.pc, Size::Word, self.program_space())?;
        self.regs.pc = self.regs.pc.wrapping_add(2);
        Ok(value as u16)
    }

    pub(crate) fn fetch_long(&mut self) -> Result<u32, Exception> {
        let hi = self.fetch_word()?;
        let lo = self.fetch_word()?;
        Ok((u32::from(hi) << 16) | u32::from(lo))
    }

    pub(crate) fn push_word(&mut self, value: u16) -> Result<(), Exception> {
        let sp = self.regs.a[7].wrapping_sub(2);
        self.regs.a[7] = sp;
        self.write_data(sp, Size::Word, u32::from(value))
    }

    pub(crate) fn push_long(&mut self, value: u32) -> Result<(), Exception> {
        let sp = self.regs.a[7].wrapping_sub(4);
        self.regs.a[7] = sp;
        self.write_data(sp, Size::Long, value)
    }

    pub(crate) fn pop_word(&mut self) -> Result<u16, Exception> {
        let sp = self.regs.a[7];
        let value = self.read_data(sp, Size::Word)?;
        self.regs.a[7] = sp.wrapping_add(2);
        Ok(value as u16)
    }

    pub(crate) fn pop_long(&mut self) -> Result<u32, Exception> {
        let sp = self.regs.a[7];
        let value = self.read_data(sp, Size::Long)?;
        self.regs.a[7] = sp.wrapping_add(4);
        Ok(value)
    }

    /// Handler address for `vector`, read from supervisor program space.
    pub(crate) fn read_vector(&self, vector: u8) -> Result<u32, Exception> {
        self.read_space(u32::from(vector) * 4, Size::Long, AddressSpace::SupervisorProgram)
    }

    /// Require supervisor mode for a privileged instruction.
    pub(crate) const fn require_supervisor(&self) -> Result<(), Exception> {
        if self.regs.is_supervisor() {
            Ok(())
        } else {
            Err(Exception::Privilege)
        }
    }

    /// Enter the STOP state.
    pub(crate) fn enter_stop(&mut self) {
        debug!("STOP at {:08X}, SR={:04X}", self.instr_pc, self.regs.sr());
        self.state = RunState::Stopped;
    }

    /// Run the host's RESET-line hook.
    pub(crate) fn assert_reset_line(&self) {
        if let Some(hook) = self.hooks.reset.clone() {
            hook();
        }
    }
}

impl Timesliced for Cpu68000 {
    fn run_for(&mut self, budget: Ticks) -> Ticks {
        let clocks = u32::try_from(budget.get()).unwrap_or(u32::MAX);
        Ticks::from(self.emulate(clocks))
    }

    fn trip(&mut self) -> Ticks {
        Ticks::from(self.trip_cycles_counter())
    }

    fn yield_now(&mut self) {
        self.release_timeslice();
    }
}

const QUERY_PATHS: &[&str] = &[
    "d0", "d1", "d2", "d3", "d4", "d5", "d6", "d7",
    "a0", "a1", "a2", "a3", "a4", "a5", "a6", "a7",
    "usp", "ssp", "pc", "sr", "ccr",
    "flags.c", "flags.v", "flags.z", "flags.n", "flags.x", "flags.s", "flags.t",
    "int_mask", "halted", "stopped", "cycles", "opcode",
];

impl Observable for Cpu68000 {
    fn query(&self, path: &str) -> Option<Value> {
        let sr = self.regs.sr();
        if let Some(n) = path.strip_prefix('d').and_then(|s| s.parse::<usize>().ok()) {
            return self.regs.d.get(n).map(|&v| v.into());
        }
        if let Some(n) = path.strip_prefix('a').and_then(|s| s.parse::<usize>().ok()) {
            return self.regs.a.get(n).map(|&v| v.into());
        }
        match path {
            "usp" => Some(self.regs.usp().into()),
            "ssp" => Some(self.regs.ssp().into()),
            "pc" => Some(self.regs.pc.into()),
            "sr" => Some(sr.into()),
            "ccr" => Some(self.regs.ccr().into()),
            "flags.c" => Some((sr & C != 0).into()),
            "flags.v" => Some((sr & V != 0).into()),
            "flags.z" => Some((sr & Z != 0).into()),
            "flags.n" => Some((sr & N != 0).into()),
            "flags.x" => Some((sr & X != 0).into()),
            "flags.s" => Some(self.regs.is_supervisor().into()),
            "flags.t" => Some(self.regs.is_trace().into()),
            "int_mask" => Some(self.regs.interrupt_mask().into()),
            "halted" => Some(self.is_halted().into()),
            "stopped" => Some(self.is_stopped().into()),
            "cycles" => Some(self.total_cycles.get().into()),
            "opcode" => Some(self.opcode.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        QUERY_PATHS
    }
}
