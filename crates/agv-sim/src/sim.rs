//! The `Sim` struct and its tick loop.

use std::sync::Arc;

use agv_agent::AgentStore;
use agv_core::{AgentId, Position, Tick};
use agv_grid::{CellKind, Grid, GuideField, ReservationTable};
use agv_plan::{PlanContext, Planner, RoutedSet};

use crate::observer::SimObserver;

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Total ticks to simulate in [`Sim::run`].
    pub total_ticks: u64,

    /// Call `on_snapshot` every N ticks.  0 disables snapshots.
    pub output_interval_ticks: u64,

    /// Explicit search-horizon override for the planner.  `None` lets the
    /// planner derive one from the grid dimensions.
    pub horizon_ticks: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            total_ticks: 1_000,
            output_interval_ticks: 0,
            horizon_ticks: None,
        }
    }
}

// ── TickStats ─────────────────────────────────────────────────────────────────

/// Movement totals for one tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Agents that advanced (a plan action applied, or a guided step —
    /// displaced agents count through the step that shoved them).
    pub moved: usize,
    /// Agents that tried to advance and could not.
    pub blocked: usize,
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The simulation driver: owns all world state and serializes every
/// planning call behind its tick loop.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    /// Global configuration.
    pub config: SimConfig,

    /// The current logical tick, advanced once per `step_tick`.
    pub now: Tick,

    /// The warehouse floor.
    pub grid: Grid,

    /// The shared time-space reservation table.
    pub reservations: ReservationTable,

    /// All agent state (SoA arrays).
    pub agents: AgentStore,

    /// The path planner.
    pub planner: Planner,

    /// Per-tick displacement marks, reset at the top of every tick.
    routed: RoutedSet,
}

impl Sim {
    pub(crate) fn new(
        config: SimConfig,
        grid: Grid,
        agents: AgentStore,
    ) -> Self {
        let planner = match config.horizon_ticks {
            Some(h) => Planner::with_horizon(h),
            None => Planner::new(),
        };
        let routed = RoutedSet::new(agents.count);
        Self {
            config,
            now: Tick::ZERO,
            grid,
            reservations: ReservationTable::new(),
            agents,
            planner,
            routed,
        }
    }

    // ── Planning API (called between ticks by the embedding application) ──

    /// Compute and share a guide field toward `destination` over cells of
    /// the given kinds.
    ///
    /// The returned field is independent of any agent; assign it to every
    /// agent bound to that destination with [`assign_guide`](Self::assign_guide).
    pub fn compute_guide(&self, destination: Position, passable: &[CellKind]) -> Arc<GuideField> {
        Arc::new(GuideField::compute(&self.grid, destination, passable))
    }

    /// Point `agent` at a guide field; it will take one guided step per
    /// tick until the field is cleared or a committed plan takes over.
    pub fn assign_guide(&mut self, agent: AgentId, guide: Arc<GuideField>) {
        self.agents.set_guide(agent, guide);
    }

    /// Stop guiding `agent`.
    pub fn clear_guide(&mut self, agent: AgentId) {
        self.agents.clear_guide(agent);
    }

    /// Plan and commit a full route for `agent` to `destination`.
    ///
    /// On success the plan is installed on the agent (one action executes
    /// per tick) and `true` is returned.  `false` means no path within the
    /// search horizon — retry later or treat the agent as blocked.
    pub fn plan_route(&mut self, agent: AgentId, destination: Position) -> bool {
        let mut ctx = PlanContext {
            grid: &mut self.grid,
            reservations: &mut self.reservations,
            agents: &mut self.agents,
            now: self.now,
        };
        match self.planner.plan_route(&mut ctx, agent, destination) {
            Some(plan) => {
                self.agents.set_plan(agent, plan);
                true
            }
            None => false,
        }
    }

    /// Cancel `agent`'s committed plan, releasing its reservations.
    pub fn drop_plan(&mut self, agent: AgentId) {
        let plan = self.agents.take_plan(agent);
        let mut ctx = PlanContext {
            grid: &mut self.grid,
            reservations: &mut self.reservations,
            agents: &mut self.agents,
            now: self.now,
        };
        self.planner.drop_plan(&mut ctx, agent, plan);
    }

    // ── Tick loop ─────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.total_ticks`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) {
        while self.now.0 < self.config.total_ticks {
            self.step_tick(observer);
        }
        observer.on_sim_end(self.now);
    }

    /// Run exactly `n` ticks from the current position (ignores
    /// `total_ticks`).  Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.step_tick(observer);
        }
    }

    /// Process one tick and advance the clock.
    pub fn step_tick<O: SimObserver>(&mut self, observer: &mut O) -> TickStats {
        let now = self.now;
        observer.on_tick_start(now);

        // ── Phase 1: reset the per-tick displacement marks ────────────────
        self.routed.reset();

        // ── Phase 2: reclaim arrival slots ────────────────────────────────
        //
        // A completed plan leaves its terminal reservation in the table (it
        // covered the arrival tick).  Once the agent idles on it the slot
        // is due; releasing it here keeps the table free of stale entries.
        // Holder-guarded release makes this a no-op for everyone else.
        for agent in 0..self.agents.count as u32 {
            let agent = AgentId(agent);
            if !self.agents.has_plan(agent) {
                let pos = self.agents.position[agent.index()];
                self.reservations.release(pos, now, agent);
            }
        }

        // ── Phase 3: rank-order sweep ─────────────────────────────────────
        //
        // Higher-ranked agents act first, so displacement chains only ever
        // push rank downhill and a preempted agent never moves before its
        // preemptor in the same tick.
        let mut stats = TickStats::default();
        for agent in self.agents.rank_order() {
            if self.agents.has_plan(agent) {
                let mut ctx = PlanContext {
                    grid: &mut self.grid,
                    reservations: &mut self.reservations,
                    agents: &mut self.agents,
                    now,
                };
                if self.planner.step(&mut ctx, agent) {
                    stats.moved += 1;
                } else {
                    stats.blocked += 1;
                    observer.on_agent_blocked(now, agent);
                }
            } else {
                let Some(guide) = self.agents.guide(agent) else {
                    continue;
                };
                // An agent standing on its target has nowhere better to be;
                // skip it rather than report a phantom blockage.  Also skip
                // agents already routed (displaced) earlier this tick.
                let at_goal = guide.distance(self.agents.position[agent.index()]) == 0;
                if at_goal || self.routed.is_marked(agent) {
                    continue;
                }
                let mut ctx = PlanContext {
                    grid: &mut self.grid,
                    reservations: &mut self.reservations,
                    agents: &mut self.agents,
                    now,
                };
                if self.planner.route_one_step(&mut ctx, agent, &mut self.routed) {
                    stats.moved += 1;
                } else {
                    stats.blocked += 1;
                    observer.on_agent_blocked(now, agent);
                }
            }
        }

        // ── Phase 4: observe and advance ──────────────────────────────────
        observer.on_tick_end(now, &stats);
        if self.config.output_interval_ticks > 0
            && now.0 % self.config.output_interval_ticks == 0
        {
            observer.on_snapshot(now, &self.agents, &self.reservations);
        }

        self.now = now + 1;
        stats
    }
}
