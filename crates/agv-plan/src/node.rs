//! Time-expanded search states and the per-search closed set.
//!
//! A [`PlanNode`] is one vertex of the time-expanded graph: where an agent
//! is, which way it faces, what tick it is, and which action produced the
//! state.  Nodes are plain `Copy` values constructed and discarded per
//! search; the transitions [`next`](PlanNode::next) /
//! [`previous`](PlanNode::previous) are exact inverses, which is what lets
//! plan reconstruction and drop-replay recompute paths arithmetically
//! instead of storing them.
//!
//! The [`VisitedTable`] is the search's closed set *and* its back-pointer
//! store: visiting a state records the action that reached it, and walking
//! `previous()` plus one table lookup per step recovers the whole action
//! sequence.  It lives exactly as long as one `plan_route` call.

use rustc_hash::FxHashMap;

use agv_core::{Action, Direction, Position, Tick};
use agv_grid::Grid;

// ── PlanNode ──────────────────────────────────────────────────────────────────

/// One state of the time-expanded search.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PlanNode {
    pub pos: Position,
    pub dir: Direction,
    /// The action whose execution produced this state.  For the initial
    /// state this is a placeholder (`Move`) — it is never emitted, because
    /// reconstruction stops before reaching it.
    pub action: Action,
    pub time: Tick,
}

impl PlanNode {
    /// The search's initial state: the agent as it stands right now.
    #[inline]
    pub fn initial(pos: Position, dir: Direction, time: Tick) -> Self {
        Self { pos, dir, action: Action::Move, time }
    }

    /// The state reached by executing `action` from `self`.
    ///
    /// Every action advances time by exactly one tick; `Move` advances the
    /// position along the current heading, rotations change only the
    /// heading.
    pub fn next(self, action: Action) -> PlanNode {
        let pos = match action {
            Action::Move => self.pos.step(self.dir),
            _ => self.pos,
        };
        PlanNode {
            pos,
            dir: action.apply_heading(self.dir),
            action,
            time: self.time + 1,
        }
    }

    /// The state `self` was expanded from, undoing `self.action`.
    ///
    /// The returned node's `action` field is carried over as a placeholder;
    /// the caller fills it from the visited table (the parent's own
    /// arriving action), since a state does not know how its parent was
    /// reached.
    pub fn previous(self) -> PlanNode {
        let (pos, dir) = match self.action {
            Action::Move        => (self.pos.step_back(self.dir), self.dir),
            Action::RotateRight => (self.pos, self.dir.rotated_left()),
            Action::RotateLeft  => (self.pos, self.dir.rotated_right()),
            Action::Nothing     => (self.pos, self.dir),
        };
        PlanNode {
            pos,
            dir,
            action: self.action,
            time: Tick(self.time.0 - 1),
        }
    }
}

// ── VisitedTable ──────────────────────────────────────────────────────────────

/// Closed set for one `plan_route` call, keyed by
/// `(cell, heading, (time − start) mod horizon)`.
///
/// # Why the modulus
///
/// Without it the time axis is unbounded and a search for an unreachable
/// destination would expand forever (every action advances time, so no two
/// states are ever equal).  Folding time onto `horizon` slots makes states
/// that differ by a whole horizon alias each other: once the search has
/// been everywhere it can go within the horizon, every successor reads as
/// visited and the frontier drains.  The horizon therefore bounds both
/// memory and how far into the future a plan may wait or detour.
///
/// Storage is a sparse `FxHashMap` — a dense array over
/// cells × headings × horizon would be mostly empty on all but the most
/// congested searches.
pub struct VisitedTable {
    cell_count: u64,
    cols: i32,
    horizon: u64,
    start: Tick,
    marks: FxHashMap<u64, Action>,
}

impl VisitedTable {
    /// A fresh, empty table for a search starting at `start`.
    ///
    /// # Panics
    /// Panics if `horizon` is zero.
    pub fn new(grid: &Grid, start: Tick, horizon: u64) -> Self {
        assert!(horizon > 0, "visited-table horizon must be positive");
        Self {
            cell_count: grid.cell_count() as u64,
            cols: grid.cols(),
            horizon,
            start,
            marks: FxHashMap::default(),
        }
    }

    /// The time horizon this table folds onto.
    #[inline]
    pub fn horizon(&self) -> u64 {
        self.horizon
    }

    /// Number of states visited so far.
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    #[inline]
    fn key(&self, node: &PlanNode) -> u64 {
        debug_assert!(
            node.dir != Direction::Still,
            "search states never face Still"
        );
        let cell = (node.pos.row as u64) * self.cols as u64 + node.pos.col as u64;
        let slot = node.time.since(self.start) % self.horizon;
        (slot * 4 + node.dir.index() as u64) * self.cell_count + cell
    }

    /// `true` if this state (or an alias a whole horizon away) was visited.
    #[inline]
    pub fn is_visited(&self, node: &PlanNode) -> bool {
        self.marks.contains_key(&self.key(node))
    }

    /// Mark `node` visited, recording its arriving action.
    ///
    /// First visit wins: re-marking an aliased or duplicate state must not
    /// rewrite the back-pointer of the state already expanded.
    pub fn visit(&mut self, node: &PlanNode) {
        self.marks.entry(self.key(node)).or_insert(node.action);
    }

    /// The arriving action recorded for `node`'s (cell, heading, slot) key.
    #[inline]
    pub fn arriving_action(&self, node: &PlanNode) -> Option<Action> {
        self.marks.get(&self.key(node)).copied()
    }
}
