//! `agv-grid` — static map, guide fields, and reservations for `rust_agv`.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`cell`]        | `CellKind`, `Cell` (kind + occupant)                  |
//! | [`grid`]        | `Grid` — bounds, accessibility, occupancy, stepping   |
//! | [`guide`]       | `GuideField` — per-destination BFS distance field     |
//! | [`reservation`] | `ReservationTable` — sparse (position, tick) → agent  |
//! | [`layout`]      | character-map parser producing a `Grid`               |
//!
//! The grid is immutable after construction except for cell *occupancy*,
//! which the routing layer updates as agents move.  Guide fields and the
//! reservation table are the two read models the planner searches against:
//! the guide field answers "which way is closer?", the reservation table
//! answers "who will be standing there at tick t?".

pub mod cell;
pub mod error;
pub mod grid;
pub mod guide;
pub mod layout;
pub mod reservation;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cell::{Cell, CellKind};
pub use error::{LayoutError, LayoutResult};
pub use grid::Grid;
pub use guide::GuideField;
pub use layout::{load_layout, parse_layout};
pub use reservation::ReservationTable;
