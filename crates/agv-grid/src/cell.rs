//! Cell kinds and per-cell state.

use std::fmt;

use agv_core::AgentId;

/// The static type of a grid cell.
///
/// Only `Empty` cells may be transited by a moving agent; the facility kinds
/// (`Rack`, `Gate`, `Station`) are valid *destinations* but never
/// intermediate waypoints, and `Obstacle` is never enterable at all.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum CellKind {
    /// Open floor.
    Empty,
    /// Permanently impassable (wall, column, disabled area).
    Obstacle,
    /// A storage rack slot.
    Rack,
    /// A delivery/receive gate.
    Gate,
    /// A charging / maintenance station.
    Station,
}

impl CellKind {
    /// The layout character for this kind (see [`crate::layout`]).
    pub fn symbol(self) -> char {
        match self {
            CellKind::Empty    => '.',
            CellKind::Obstacle => '#',
            CellKind::Rack     => 'R',
            CellKind::Gate     => 'G',
            CellKind::Station  => 'S',
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CellKind::Empty    => "empty",
            CellKind::Obstacle => "obstacle",
            CellKind::Rack     => "rack",
            CellKind::Gate     => "gate",
            CellKind::Station  => "station",
        };
        write!(f, "{s}")
    }
}

/// One grid cell: its static kind plus the agent currently standing on it.
///
/// The occupant is a weak reference by id — the grid does not own agents.
/// Invariant: at most one agent occupies a cell at any instant; the routing
/// layer maintains this by always vacating before entering.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Cell {
    pub kind: CellKind,
    pub occupant: Option<AgentId>,
}

impl Cell {
    pub fn new(kind: CellKind) -> Self {
        Self { kind, occupant: None }
    }
}
