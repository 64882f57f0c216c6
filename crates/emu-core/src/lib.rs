//! Core traits and types for cycle-counted emulation.
//!
//! Components are driven by the host in cycle budgets. A component runs
//! until its budget is spent (possibly overrunning by the last indivisible
//! step) and reports what it actually consumed, so the host can keep every
//! device on one timeline.

mod observable;
mod ticks;
mod timeslice;

pub use observable::{Observable, Value};
pub use ticks::Ticks;
pub use timeslice::Timesliced;
