//! Simulation observer trait for progress reporting and data collection.

use agv_agent::AgentStore;
use agv_core::{AgentId, Tick};
use agv_grid::ReservationTable;

use crate::sim::TickStats;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — blockage logger
///
/// ```rust,ignore
/// struct BlockageLog(Vec<(Tick, AgentId)>);
///
/// impl SimObserver for BlockageLog {
///     fn on_agent_blocked(&mut self, tick: Tick, agent: AgentId) {
///         self.0.push((tick, agent));
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called when an agent could not advance this tick: its guided step
    /// found no free or displaceable cell, or a committed plan hit an
    /// occupied cell and was dropped.
    ///
    /// Both conditions are recoverable — the agent retries or re-plans on a
    /// later tick — but embedding applications usually want to surface them
    /// (e.g. raise a blockage alarm after N consecutive notifications).
    fn on_agent_blocked(&mut self, _tick: Tick, _agent: AgentId) {}

    /// Called at the end of each tick with that tick's movement totals.
    fn on_tick_end(&mut self, _tick: Tick, _stats: &TickStats) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`
    /// ticks).
    ///
    /// Provides read-only access to the full agent and reservation state so
    /// output writers can record positions without the sim knowing about
    /// any specific format.
    fn on_snapshot(
        &mut self,
        _tick:         Tick,
        _agents:       &AgentStore,
        _reservations: &ReservationTable,
    ) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
