//! `agv-core` — foundational types for the `rust_agv` fleet-routing framework.
//!
//! This crate is a dependency of every other `agv-*` crate.  It intentionally
//! has no `agv-*` dependencies and no external ones.
//!
//! # What lives here
//!
//! | Module      | Contents                                          |
//! |-------------|---------------------------------------------------|
//! | [`ids`]     | `AgentId`                                         |
//! | [`coord`]   | `Position`, `Direction`, grid-step arithmetic     |
//! | [`action`]  | `Action`, `ActionPlan`, `MOVE_ACTIONS`            |
//! | [`time`]    | `Tick`                                            |

pub mod action;
pub mod coord;
pub mod ids;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use action::{Action, ActionPlan, MOVE_ACTIONS};
pub use coord::{Direction, Position, MOVE_DIRECTIONS};
pub use ids::AgentId;
pub use time::Tick;
