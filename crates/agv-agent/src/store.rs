//! Core agent storage: `AgentStore` (SoA data) and its builder.
//!
//! # Data layout
//!
//! Structure-of-Arrays: every `Vec` field has exactly `count` elements and
//! the `AgentId` value is the index into all of them:
//!
//! ```ignore
//! let pos = store.position[agent.index()];  // O(1), cache-friendly
//! ```
//!
//! Guide fields are shared: several agents bound to the same destination
//! hold `Arc`s to one computed field, so the per-agent slot is
//! `Option<Arc<GuideField>>`.
//!
//! # Rank
//!
//! Priority is a `u32` where **lower values outrank higher ones**; ties
//! break toward the lower `AgentId`.  This gives the strict total order the
//! displacement and preemption rules assume — no two agents ever have equal
//! rank.

use std::sync::Arc;

use agv_core::{Action, ActionPlan, AgentId, Direction, Position};
use agv_grid::{Grid, GuideField};

// ── AgentSpec ─────────────────────────────────────────────────────────────────

/// Initial description of one agent, as loaded from the roster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentSpec {
    pub position: Position,
    pub direction: Direction,
    /// Rank value; lower outranks higher.
    pub priority: u32,
}

// ── AgentStore ────────────────────────────────────────────────────────────────

/// Structure-of-Arrays storage for all agent state.
pub struct AgentStore {
    /// Number of agents.  Equals the length of every SoA `Vec`.
    pub count: usize,

    /// Current cell, indexed by `AgentId`.
    pub position: Vec<Position>,

    /// Current heading, indexed by `AgentId`.
    pub direction: Vec<Direction>,

    /// Rank value (lower outranks), indexed by `AgentId`.
    pub priority: Vec<u32>,

    /// The guide field the agent currently follows, if any.
    pub guide: Vec<Option<Arc<GuideField>>>,

    /// The committed action plan (empty = none), indexed by `AgentId`.
    pub plan: Vec<ActionPlan>,
}

impl AgentStore {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterator over all `AgentId`s in ascending index order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.count as u32).map(AgentId)
    }

    /// All agents sorted by rank: ascending (priority, id).
    ///
    /// The tick driver visits agents in this order so higher-ranked agents
    /// move first and displacement chains only ever push rank downhill.
    pub fn rank_order(&self) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self.agent_ids().collect();
        ids.sort_by_key(|a| (self.priority[a.index()], *a));
        ids
    }

    /// `true` if `a` strictly outranks `b` (would win any contention).
    ///
    /// Lower priority value wins; equal values fall back to the lower id,
    /// so the relation is a strict total order and `outranks(a, a)` is
    /// always `false`.
    #[inline]
    pub fn outranks(&self, a: AgentId, b: AgentId) -> bool {
        (self.priority[a.index()], a) < (self.priority[b.index()], b)
    }

    // ── Plan access ───────────────────────────────────────────────────────

    #[inline]
    pub fn has_plan(&self, agent: AgentId) -> bool {
        !self.plan[agent.index()].is_empty()
    }

    /// Install a committed plan, replacing whatever was there.
    pub fn set_plan(&mut self, agent: AgentId, plan: ActionPlan) {
        self.plan[agent.index()] = plan;
    }

    /// Remove and return the agent's plan, leaving it empty.
    pub fn take_plan(&mut self, agent: AgentId) -> ActionPlan {
        std::mem::take(&mut self.plan[agent.index()])
    }

    /// The next pending action, without consuming it.
    #[inline]
    pub fn peek_action(&self, agent: AgentId) -> Option<Action> {
        self.plan[agent.index()].peek()
    }

    /// Consume the next pending action.
    #[inline]
    pub fn pop_action(&mut self, agent: AgentId) -> Option<Action> {
        self.plan[agent.index()].pop()
    }

    // ── Guide access ──────────────────────────────────────────────────────

    pub fn set_guide(&mut self, agent: AgentId, guide: Arc<GuideField>) {
        self.guide[agent.index()] = Some(guide);
    }

    pub fn clear_guide(&mut self, agent: AgentId) {
        self.guide[agent.index()] = None;
    }

    #[inline]
    pub fn guide(&self, agent: AgentId) -> Option<&Arc<GuideField>> {
        self.guide[agent.index()].as_ref()
    }

    // ── Movement primitives ───────────────────────────────────────────────

    /// Move `agent` one cell in `dir`, transferring grid occupancy and
    /// turning the agent to face its direction of travel.
    ///
    /// The destination cell must be vacant — the routing layer guarantees
    /// this by displacing or refusing first.
    pub fn apply_move(&mut self, agent: AgentId, dir: Direction, grid: &mut Grid) {
        let from = self.position[agent.index()];
        let to = from.step(dir);

        let occupant = grid.remove(from);
        debug_assert_eq!(occupant, Some(agent), "agent {agent} not at {from}");
        grid.place(agent, to);

        self.position[agent.index()] = to;
        self.direction[agent.index()] = dir;
    }

    /// Rotate `agent` in place according to `action` (no-op for `Nothing`).
    pub fn apply_rotation(&mut self, agent: AgentId, action: Action) {
        debug_assert!(
            !matches!(action, Action::Move),
            "apply_rotation called with a Move action"
        );
        let dir = self.direction[agent.index()];
        self.direction[agent.index()] = action.apply_heading(dir);
    }
}

// ── AgentStoreBuilder ─────────────────────────────────────────────────────────

/// Fluent builder for [`AgentStore`].
///
/// Accepts agents in any order; ids are assigned sequentially from 0.
///
/// # Example
///
/// ```
/// use agv_agent::AgentStoreBuilder;
/// use agv_core::{Direction, Position};
///
/// let mut b = AgentStoreBuilder::new();
/// let a = b.add_agent(Position::new(0, 0), Direction::East, 0);
/// let c = b.add_agent(Position::new(1, 0), Direction::North, 1);
/// let store = b.build();
/// assert_eq!(store.count, 2);
/// assert!(store.outranks(a, c));
/// ```
#[derive(Default)]
pub struct AgentStoreBuilder {
    specs: Vec<AgentSpec>,
}

impl AgentStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the builder with a pre-loaded roster (e.g. from
    /// [`load_roster_csv`](crate::load_roster_csv)).
    pub fn from_specs(specs: Vec<AgentSpec>) -> Self {
        Self { specs }
    }

    /// Add one agent and return its `AgentId` (sequential from 0).
    pub fn add_agent(&mut self, position: Position, direction: Direction, priority: u32) -> AgentId {
        let id = AgentId(self.specs.len() as u32);
        self.specs.push(AgentSpec { position, direction, priority });
        id
    }

    pub fn agent_count(&self) -> usize {
        self.specs.len()
    }

    /// Consume the builder and produce an [`AgentStore`].
    ///
    /// Grid placement (occupancy) is the caller's job — typically the sim
    /// builder, which also validates positions against the map.
    pub fn build(self) -> AgentStore {
        let count = self.specs.len();
        AgentStore {
            count,
            position:  self.specs.iter().map(|s| s.position).collect(),
            direction: self.specs.iter().map(|s| s.direction).collect(),
            priority:  self.specs.iter().map(|s| s.priority).collect(),
            guide:     vec![None; count],
            plan:      vec![ActionPlan::empty(); count],
        }
    }
}
