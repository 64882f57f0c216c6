//! Host callback slots and the handle callbacks use to steer the run loop.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::registers::Registers;

/// Called when the CPU executes RESET.
pub type ResetHook = Rc<dyn Fn()>;
/// Called during interrupt acknowledge with the accepted level.
pub type IackHook = Rc<dyn Fn(u8)>;
/// Replaces exception processing for one vector. Receives the vector
/// number and the register file, which it may modify freely.
pub type VectorHook = Rc<dyn Fn(u8, &mut Registers)>;

/// Named callback slots. Empty slots cost nothing.
#[derive(Clone, Default)]
pub struct Hooks {
    pub reset: Option<ResetHook>,
    pub iack: Option<IackHook>,
    pub vectors: BTreeMap<u8, VectorHook>,
}

impl Hooks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intercept `vector`: the hook runs instead of stacking a frame and
    /// jumping through the vector table.
    pub fn intercept(&mut self, vector: u8, hook: VectorHook) -> &mut Self {
        self.vectors.insert(vector, hook);
        self
    }

    pub(crate) fn vector(&self, vector: u8) -> Option<VectorHook> {
        self.vectors.get(&vector).cloned()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("reset", &self.reset.is_some())
            .field("iack", &self.iack.is_some())
            .field("vectors", &self.vectors.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Default)]
struct ControlState {
    release: Cell<bool>,
    stop: Cell<bool>,
    adjust: Cell<i64>,
}

/// Cloneable handle for requests made from inside callbacks.
///
/// Callbacks never hold the CPU itself; they hold one of these and the
/// run loop picks the requests up at the next instruction boundary.
#[derive(Clone, Default)]
pub struct CpuControl {
    state: Rc<ControlState>,
}

impl CpuControl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// End the current `emulate` call after the in-flight instruction.
    pub fn release_timeslice(&self) {
        self.state.release.set(true);
    }

    /// End the current `emulate` call at the next instruction boundary.
    pub fn stop_emulating(&self) {
        self.state.stop.set(true);
    }

    /// Charge extra cycles (bus contention, DMA).
    pub fn add_cycles(&self, cycles: u32) {
        self.state.adjust.set(self.state.adjust.get() + i64::from(cycles));
    }

    /// Give cycles back, never more than the counter holds.
    pub fn release_cycles(&self, cycles: u32) {
        self.state.adjust.set(self.state.adjust.get() - i64::from(cycles));
    }

    pub(crate) fn resume(&self) {
        self.state.stop.set(false);
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.state.stop.get()
    }

    /// Take the release request, leaving it cleared.
    pub(crate) fn take_release(&self) -> bool {
        self.state.release.replace(false)
    }

    /// Take the accumulated cycle adjustment, leaving zero.
    pub(crate) fn take_adjustment(&self) -> i64 {
        self.state.adjust.replace(0)
    }
}

impl fmt::Debug for CpuControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CpuControl")
            .field("release", &self.state.release.get())
            .field("stop", &self.state.stop.get())
            .field("adjust", &self.state.adjust.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_requests() {
        let control = CpuControl::new();
        let handle = control.clone();
        handle.add_cycles(10);
        handle.release_cycles(4);
        handle.release_timeslice();
        assert_eq!(control.take_adjustment(), 6);
        assert_eq!(control.take_adjustment(), 0);
        assert!(control.take_release());
        assert!(!control.take_release());
    }

    #[test]
    fn stop_request_holds_until_cleared() {
        let control = CpuControl::new();
        control.stop_emulating();
        assert!(control.is_stopped());
        assert!(control.is_stopped());
        control.resume();
        assert!(!control.is_stopped());
    }

    #[test]
    fn intercept_replaces_previous_hook() {
        let mut hooks = Hooks::new();
        hooks.intercept(32, Rc::new(|_: u8, regs: &mut Registers| regs.d[0] = 1));
        hooks.intercept(32, Rc::new(|_: u8, regs: &mut Registers| regs.d[0] = 2));
        let mut regs = Registers::new();
        let hook = hooks.vector(32).unwrap();
        hook(32, &mut regs);
        assert_eq!(regs.d[0], 2);
        assert!(hooks.vector(33).is_none());
    }
}
