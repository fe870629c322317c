//! `agv-plan` — the path-planning and collision-avoidance engine.
//!
//! # The three planning modes
//!
//! | Entry point                    | What it does                                         |
//! |--------------------------------|------------------------------------------------------|
//! | [`Planner::route_one_step`]    | one greedy guided step, displacing lower-ranked agents |
//! | [`Planner::plan_route`]        | full time-expanded search against the reservation table |
//! | [`Planner::step`]              | execute one action of a committed plan               |
//!
//! plus [`Planner::drop_plan`], the rollback that keeps the reservation
//! table honest whenever a plan is abandoned.
//!
//! # Concurrency model
//!
//! None — deliberately.  Every entry point takes a [`PlanContext`] of
//! exclusive borrows and runs to completion inside one serialized
//! simulation tick.  The per-tick [`RoutedSet`] must be reset by the tick
//! owner before the first `route_one_step` of each tick; failing to reset
//! it is a correctness bug (agents silently refuse to move), not a
//! concurrency bug.

pub mod node;
pub mod planner;
pub mod routed;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use node::{PlanNode, VisitedTable};
pub use planner::{PlanContext, Planner};
pub use routed::RoutedSet;
