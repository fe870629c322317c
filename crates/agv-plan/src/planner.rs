//! The planner: guided routing, time-expanded search, commit and rollback.
//!
//! # Failure is a value
//!
//! Every planning outcome is expressed in the return value — `false` for "the
//! agent stays put this tick", `None` for "no path exists right now".  The
//! caller retries on a later tick or raises a blockage; nothing here is an
//! error.  Conditions that *are* errors (out-of-bounds destination, planning
//! for an agent facing `Still`) indicate a broken caller and assert.
//!
//! # Right-of-way
//!
//! Rank (ascending `(priority, id)`) settles every conflict the same way:
//! `route_one_step` never displaces an agent that outranks the one being
//! routed, `plan_route` treats an outranking agent's future reservation as a
//! wall, and `construct_plan` preempts — drops the whole plan of — any
//! lower-ranked agent whose reservation it overwrites.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use agv_agent::AgentStore;
use agv_core::{Action, ActionPlan, AgentId, Direction, Position, Tick, MOVE_ACTIONS};
use agv_grid::{Grid, ReservationTable};

use crate::node::{PlanNode, VisitedTable};
use crate::routed::RoutedSet;

// ── PlanContext ───────────────────────────────────────────────────────────────

/// Exclusive borrows of everything a planning call may touch, plus the
/// current logical time.
///
/// There is no hidden shared state: the tick owner assembles a context from
/// its own fields for each call, which is also what serializes planning —
/// two contexts cannot exist at once.
pub struct PlanContext<'a> {
    pub grid: &'a mut Grid,
    pub reservations: &'a mut ReservationTable,
    pub agents: &'a mut AgentStore,
    /// The current logical tick, owned by the outer loop.
    pub now: Tick,
}

// ── Planner ───────────────────────────────────────────────────────────────────

/// The multi-agent path planner.
///
/// Stateless between calls apart from configuration; all mutable state lives
/// in the [`PlanContext`].
#[derive(Clone, Debug, Default)]
pub struct Planner {
    /// Explicit search horizon override.  `None` derives one from the grid.
    horizon: Option<u64>,
}

impl Planner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the derived search horizon (ticks past `now` the search may
    /// wait or detour before states alias and the search gives up).
    pub fn with_horizon(horizon: u64) -> Self {
        Self { horizon: Some(horizon) }
    }

    /// The horizon used for a search over `grid`: the override if set, else
    /// `4 * (rows + cols)` clamped to at least 64 — room for a full
    /// perimeter detour plus rotation slack on any grid.
    pub fn horizon_for(&self, grid: &Grid) -> u64 {
        self.horizon
            .unwrap_or_else(|| (4 * (grid.rows() + grid.cols()) as u64).max(64))
    }

    // ── Single-tick guided routing with displacement ──────────────────────

    /// Advance `agent` one cell toward its guide-field target, recursively
    /// displacing lower-ranked agents out of the way.
    ///
    /// Returns `true` iff the agent moved.  `false` means blocked this tick;
    /// the caller should raise a blockage notification rather than retry in
    /// a tight loop.
    ///
    /// `routed` must have been reset at the start of the current tick.
    pub fn route_one_step(
        &self,
        ctx: &mut PlanContext<'_>,
        agent: AgentId,
        routed: &mut RoutedSet,
    ) -> bool {
        self.displace(ctx, agent, agent, routed)
    }

    /// Depth-first displacement: try to move `agent` so that `main`'s chain
    /// of contention resolves.  Called initially with `agent == main`.
    fn displace(
        &self,
        ctx: &mut PlanContext<'_>,
        agent: AgentId,
        main: AgentId,
        routed: &mut RoutedSet,
    ) -> bool {
        // Never displace an agent that outranks the one being routed.
        if ctx.agents.outranks(agent, main) {
            return false;
        }

        // Each agent is considered at most once per tick — this is the
        // cycle guard and the double-move guard in one.
        if routed.is_marked(agent) {
            return false;
        }
        routed.mark(agent);

        let cur = ctx.agents.position[agent.index()];
        let guide = ctx.agents.guide(agent).cloned();

        // Candidate directions: guided agents walk their own descent order;
        // unguided agents (displacement victims without a target) step into
        // any adjacent empty cell.
        let dirs: Vec<Direction> = match &guide {
            Some(g) => g.guide_directions(cur),
            None => ctx.grid.empty_directions(cur),
        };

        for dir in dirs {
            let nxt = cur.step(dir);

            // The main agent never moves away from its target; an agent
            // being displaced may (that is the point of displacing it).
            if agent == main {
                if let Some(g) = &guide {
                    if g.distance(nxt) >= g.distance(cur) {
                        continue;
                    }
                }
            }

            match ctx.grid.occupant(nxt) {
                None => {
                    self.shove(ctx, agent, dir);
                    return true;
                }
                Some(other) => {
                    if self.displace(ctx, other, main, routed) {
                        self.shove(ctx, agent, dir);
                        return true;
                    }
                }
            }
        }

        false
    }

    /// Move `agent` one cell in `dir` during displacement, first cancelling
    /// any committed plan — the shove moves the agent off the path its
    /// reservations describe, so they must not survive it.
    fn shove(&self, ctx: &mut PlanContext<'_>, agent: AgentId, dir: Direction) {
        if ctx.agents.has_plan(agent) {
            let plan = ctx.agents.take_plan(agent);
            self.drop_plan(ctx, agent, plan);
        }
        ctx.agents.apply_move(agent, dir, ctx.grid);
    }

    // ── Time-expanded reservation-aware search ────────────────────────────

    /// Compute a minimum-time action sequence from `agent`'s current state
    /// to `destination`, honouring static obstacles and outranking agents'
    /// future reservations.
    ///
    /// On success the path's reservations are already committed (preempting
    /// lower-ranked plans as needed) and the returned plan must be installed
    /// on the agent — or rolled back with [`drop_plan`](Self::drop_plan) —
    /// before any further planning.  `None` means no path within the search
    /// horizon; retry on a later tick or mark the agent blocked.
    ///
    /// Any plan the agent already holds is dropped first, so re-planning is
    /// always safe.
    ///
    /// # Panics
    /// Panics if `destination` is out of bounds or the agent faces `Still`
    /// (programmer errors).
    pub fn plan_route(
        &self,
        ctx: &mut PlanContext<'_>,
        agent: AgentId,
        destination: Position,
    ) -> Option<ActionPlan> {
        assert!(
            ctx.grid.in_bounds(destination),
            "plan destination {destination} out of bounds"
        );
        assert!(
            ctx.agents.direction[agent.index()] != Direction::Still,
            "cannot plan for {agent}: agent has no concrete heading"
        );

        if ctx.agents.has_plan(agent) {
            let old = ctx.agents.take_plan(agent);
            self.drop_plan(ctx, agent, old);
        }

        let start_pos = ctx.agents.position[agent.index()];
        if start_pos == destination {
            return Some(ActionPlan::empty());
        }

        let mut visited = VisitedTable::new(ctx.grid, ctx.now, self.horizon_for(ctx.grid));

        // Min-heap on (time, insertion seq).  All actions cost one tick, so
        // this degenerates to breadth-first order over the time-expanded
        // graph and the first completion is minimum-time.  The sequence
        // number pins equal-time ties to FIFO for determinism.
        let mut queue: BinaryHeap<QueueEntry> = BinaryHeap::new();
        let mut seq: u64 = 0;
        queue.push(QueueEntry {
            node: PlanNode::initial(start_pos, ctx.agents.direction[agent.index()], ctx.now),
            seq,
        });

        while let Some(QueueEntry { node: cur, .. }) = queue.pop() {
            // Lazy deletion: a state may be enqueued several times; only the
            // first dequeue expands it.
            if visited.is_visited(&cur) {
                continue;
            }
            visited.visit(&cur);

            for action in MOVE_ACTIONS {
                let nxt = cur.next(action);

                if !ctx.grid.in_bounds(nxt.pos) || visited.is_visited(&nxt) {
                    continue;
                }

                // An outranking agent's future reservation is a wall.
                if let Some(holder) = ctx.reservations.holder(nxt.pos, nxt.time) {
                    if ctx.agents.outranks(holder, agent) {
                        continue;
                    }
                }

                // Destination first, facility check second: targets are
                // usually facilities and must be reachable as terminals —
                // just never transited.
                if nxt.pos == destination {
                    return Some(self.construct_plan(ctx, agent, nxt, &visited));
                }

                if !ctx.grid.is_free(nxt.pos) {
                    continue;
                }

                seq += 1;
                queue.push(QueueEntry { node: nxt, seq });
            }
        }

        None
    }

    // ── Plan construction and reservation commit ──────────────────────────

    /// Walk `terminal` back to the search's start tick, committing a
    /// reservation for every state on the path and preempting lower-ranked
    /// holders, and return the execution-ordered action sequence.
    fn construct_plan(
        &self,
        ctx: &mut PlanContext<'_>,
        agent: AgentId,
        terminal: PlanNode,
        visited: &VisitedTable,
    ) -> ActionPlan {
        let mut plan = ActionPlan::empty();
        let mut node = terminal;

        loop {
            // Preemption: the search only let lower-ranked reservations
            // through, so whoever holds this slot loses their entire plan.
            if let Some(holder) = ctx.reservations.holder(node.pos, node.time) {
                if holder != agent {
                    debug_assert!(
                        !ctx.agents.outranks(holder, agent),
                        "search admitted a slot held by outranking {holder}"
                    );
                    let lost = ctx.agents.take_plan(holder);
                    self.drop_plan(ctx, holder, lost);
                }
            }
            ctx.reservations.reserve(node.pos, node.time, agent);

            // Stop on reaching the start *tick* — a position test would
            // truncate paths that re-cross the starting cell later on.
            if node.time == ctx.now {
                break;
            }

            plan.push_front(node.action);

            let mut parent = node.previous();
            parent.action = visited
                .arriving_action(&parent)
                .expect("plan reconstruction: parent state missing from visited table");
            node = parent;
        }

        plan
    }

    // ── Plan cancellation ─────────────────────────────────────────────────

    /// Release every reservation `plan` still holds for `agent`, replaying
    /// the remaining actions forward from the agent's current state purely
    /// to recompute the (position, time) pairs.
    ///
    /// Idempotent, and holder-guarded: slots already re-reserved by a
    /// preemptor are left alone.  Must be called whenever a plan is
    /// abandoned — cancellation, preemption, or a blocked execution step —
    /// or the table leaks phantom reservations that block a cell-time slot
    /// forever.
    pub fn drop_plan(&self, ctx: &mut PlanContext<'_>, agent: AgentId, plan: ActionPlan) {
        let mut node = PlanNode::initial(
            ctx.agents.position[agent.index()],
            ctx.agents.direction[agent.index()],
            ctx.now,
        );
        ctx.reservations.release(node.pos, node.time, agent);

        for action in plan.iter() {
            node = node.next(action);
            ctx.reservations.release(node.pos, node.time, agent);
        }
    }

    // ── Committed-plan execution ──────────────────────────────────────────

    /// Execute the next action of `agent`'s committed plan at the current
    /// tick.
    ///
    /// Returns `true` if the action was applied.  A `Move` into an occupied
    /// cell fails: the blocker cannot be slid aside (see `slide` below), so
    /// the entire plan is dropped — reservations released — and `false` is
    /// returned for the caller to surface as a blockage.
    ///
    /// The pending action is consumed only on success, so the drop-replay
    /// walks exactly the states the plan still held.
    pub fn step(&self, ctx: &mut PlanContext<'_>, agent: AgentId) -> bool {
        let Some(action) = ctx.agents.peek_action(agent) else {
            debug_assert!(false, "step called on {agent} with no pending plan");
            return true;
        };

        let cur = ctx.agents.position[agent.index()];

        // Rotations and waits cannot collide.
        if !matches!(action, Action::Move) {
            ctx.reservations.release(cur, ctx.now, agent);
            ctx.agents.pop_action(agent);
            ctx.agents.apply_rotation(agent, action);
            return true;
        }

        let dir = ctx.agents.direction[agent.index()];
        let nxt = cur.step(dir);

        if let Some(blocker) = ctx.grid.occupant(nxt) {
            if !self.slide(ctx, blocker, agent) {
                let plan = ctx.agents.take_plan(agent);
                self.drop_plan(ctx, agent, plan);
                return false;
            }
        }

        ctx.reservations.release(cur, ctx.now, agent);
        ctx.agents.pop_action(agent);
        ctx.agents.apply_move(agent, dir, ctx.grid);
        true
    }

    /// Slide a blocking agent aside on the execution path.
    ///
    /// Unsupported: committed plans get right-of-way from reservations, and
    /// a slide here would invalidate the blocker's own committed state.
    /// Always reports inability, so a blocked `Move` drops the plan and the
    /// agent re-plans from its actual position.
    fn slide(&self, _ctx: &mut PlanContext<'_>, _blocker: AgentId, _main: AgentId) -> bool {
        false
    }
}

// ── Search queue entry ────────────────────────────────────────────────────────

/// Heap entry ordered ascending by (time, insertion sequence).
///
/// `BinaryHeap` is a max-heap, so `Ord` is reversed.
struct QueueEntry {
    node: PlanNode,
    seq: u64,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.node.time == other.node.time && self.seq == other.seq
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.node.time, other.seq).cmp(&(self.node.time, self.seq))
    }
}
