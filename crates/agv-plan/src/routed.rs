//! `RoutedSet` — the per-tick displacement marker.
//!
//! The recursive displacement in `route_one_step` must visit every agent at
//! most once per tick: once an agent has moved (or refused to move) it may
//! not be reconsidered, or a cyclic contention graph would recurse forever
//! and a lucky agent could be shoved twice in one tick.
//!
//! The marker is an explicit set passed into the recursion rather than a
//! flag on the agent, so ownership of the reset is unambiguous: the tick
//! owner calls [`reset`](RoutedSet::reset) exactly once at the start of
//! every tick.

use agv_core::AgentId;

/// Per-tick "already routed" marks, indexed by `AgentId`.
pub struct RoutedSet {
    marks: Vec<bool>,
}

impl RoutedSet {
    /// An all-clear set for `agent_count` agents.
    pub fn new(agent_count: usize) -> Self {
        Self { marks: vec![false; agent_count] }
    }

    /// Clear all marks.  Call once per tick, before any routing.
    pub fn reset(&mut self) {
        self.marks.fill(false);
    }

    /// Mark `agent` as processed this tick.
    #[inline]
    pub fn mark(&mut self, agent: AgentId) {
        self.marks[agent.index()] = true;
    }

    /// `true` if `agent` was already processed this tick.
    #[inline]
    pub fn is_marked(&self, agent: AgentId) -> bool {
        self.marks[agent.index()]
    }

    /// Number of agents marked this tick.
    pub fn marked_count(&self) -> usize {
        self.marks.iter().filter(|&&m| m).count()
    }
}
