//! Budget-driven execution contract.

use crate::Ticks;

/// A component the host advances in cycle budgets.
///
/// The host interleaves several components on one clock by giving each a
/// budget in turn. A component may overrun its budget by the cost of the
/// last indivisible unit of work (an instruction, for a CPU), so hosts must
/// read back what was consumed rather than assume the budget was spent
/// exactly.
pub trait Timesliced {
    /// Run for at least `budget` cycles unless stopped early.
    ///
    /// Returns the cycles actually consumed by this call.
    fn run_for(&mut self, budget: Ticks) -> Ticks;

    /// Read and clear the consumed-cycles counter.
    fn trip(&mut self) -> Ticks;

    /// Ask the component to return from `run_for` at its next safe point.
    fn yield_now(&mut self);
}
