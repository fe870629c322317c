//! `ReservationTable` — the sparse time-space occupancy map.
//!
//! # Why sparse
//!
//! A dense (cells × horizon) array would be mostly vacant: only committed
//! plans create entries, and a plan touches one cell per tick.  A hash map
//! keyed by `(Position, Tick)` keeps memory proportional to the number of
//! outstanding reservations and makes "absent = free" the natural reading.
//!
//! `FxHashMap` because the key is a few integers and the lookups sit on the
//! planner's innermost loop.
//!
//! # Lifetime of an entry
//!
//! Entries are created when a plan is committed, released one per tick as
//! the plan executes, and bulk-released when a plan is dropped (cancelled,
//! preempted, or blocked).  Releases are holder-guarded: dropping a
//! preempted plan must not clear slots the preemptor has already
//! re-reserved.

use rustc_hash::FxHashMap;

use agv_core::{AgentId, Position, Tick};

/// Sparse `(position, tick) → agent` map enforcing collision-free
/// time-expanded paths.
///
/// Invariant: at most one agent per key, by map construction.
#[derive(Default)]
pub struct ReservationTable {
    slots: FxHashMap<(Position, Tick), AgentId>,
}

impl ReservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The agent reserved at `(pos, tick)`, or `None` if the slot is free.
    #[inline]
    pub fn holder(&self, pos: Position, tick: Tick) -> Option<AgentId> {
        self.slots.get(&(pos, tick)).copied()
    }

    /// Reserve `(pos, tick)` for `agent`, overwriting any previous holder.
    ///
    /// Overwrite is the preemption primitive: the planner drops the loser's
    /// plan first, then claims the slot (last writer wins within the
    /// serialized tick).
    pub fn reserve(&mut self, pos: Position, tick: Tick, agent: AgentId) {
        self.slots.insert((pos, tick), agent);
    }

    /// Release `(pos, tick)` if — and only if — `agent` still holds it.
    ///
    /// Idempotent: releasing a free slot, or one since re-reserved by
    /// another agent, is a no-op.  Returns `true` if an entry was removed.
    pub fn release(&mut self, pos: Position, tick: Tick, agent: AgentId) -> bool {
        match self.slots.get(&(pos, tick)) {
            Some(&holder) if holder == agent => {
                self.slots.remove(&(pos, tick));
                true
            }
            _ => false,
        }
    }

    /// Number of outstanding reservations.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate all outstanding reservations (order unspecified).
    pub fn iter(&self) -> impl Iterator<Item = (Position, Tick, AgentId)> + '_ {
        self.slots.iter().map(|(&(pos, tick), &agent)| (pos, tick, agent))
    }
}
