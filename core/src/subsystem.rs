//! Subsystem trait and the per-tick scratch ledger.
//!
//! RULE: Every subsystem implements SimSubsystem.
//! The engine calls update() on each registered subsystem
//! in registration order, every tick.
//! Execution order is fixed and documented in engine.rs.

use crate::{
    error::SimResult,
    event::SimEvent,
    rng::RandomSource,
    state::PlayerState,
    types::{Money, Tick},
};

/// Cash flows of the month in progress. Reset at the start of each tick;
/// later subsystems and the engine read what earlier ones wrote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthFlows {
    pub bonus: Money,
    pub invested: Money,
    /// The sampled return, before the zero-invested check.
    pub monthly_return: f64,
    /// The return recorded in history (0 when no capital was invested).
    pub realised_return: f64,
    pub investment_return: Money,
    pub dividends: Money,
    pub market_impact: Money,
}

/// The contract every subsystem must fulfill.
pub trait SimSubsystem: Send {
    /// Unique stable name for this subsystem.
    fn name(&self) -> &'static str;

    /// Called once per tick by the engine.
    ///
    /// - `tick`:   the tick being simulated (already incremented)
    /// - `player`: the session's player state, mutated in place
    /// - `flows`:  this month's ledger, shared with later subsystems
    /// - `rng`:    this subsystem's random source
    ///
    /// Returns the notable events produced by this step.
    fn update(
        &mut self,
        tick: Tick,
        player: &mut PlayerState,
        flows: &mut MonthFlows,
        rng: &mut dyn RandomSource,
    ) -> SimResult<Vec<SimEvent>>;
}
