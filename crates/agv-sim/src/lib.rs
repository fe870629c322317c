//! `agv-sim` — tick-loop driver for the rust_agv framework.
//!
//! # Tick anatomy
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Reset    — clear the per-tick RoutedSet.
//!   ② Reclaim  — release arrival-slot reservations of idle agents.
//!   ③ Sweep    — visit agents in rank order:
//!                  has a plan        → execute one action (step)
//!                  has a guide field → one guided step with displacement
//!                  otherwise         → idle
//!   ④ Observe  — on_tick_end, periodic on_snapshot.
//! ```
//!
//! All mutation is serialized behind `step_tick`: exactly one `PlanContext`
//! exists at a time, assembled from the sim's own fields.  Between ticks the
//! embedding application assigns guide fields and requests plans — task and
//! order lifecycle live outside this crate.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use agv_grid::parse_layout;
//! use agv_sim::{NoopObserver, SimBuilder, SimConfig};
//!
//! let grid = parse_layout(include_str!("floor.map"))?;
//! let mut sim = SimBuilder::new(grid, SimConfig::default())
//!     .roster(load_roster_csv(path)?)
//!     .build()?;
//! sim.plan_route(agent, dock);
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::{Sim, SimConfig, TickStats};
