//! The warehouse grid map.
//!
//! # Data layout
//!
//! Cells are stored row-major in a single `Vec<Cell>`; the index of
//! `(row, col)` is `row * cols + col`.  All coordinate arithmetic is signed
//! (`i32`) so that stepping off the edge produces an out-of-bounds
//! `Position` that the accessibility checks reject, rather than a wrap or a
//! panic.

use agv_core::{AgentId, Direction, Position, MOVE_DIRECTIONS};

use crate::cell::{Cell, CellKind};

/// A 2D grid of cells with occupancy tracking.
///
/// The cell *kinds* are fixed after construction; only occupancy changes at
/// runtime.  Geometry queries (`step`, `step_back`, `in_bounds`) are pure.
#[derive(Debug)]
pub struct Grid {
    rows: i32,
    cols: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// An all-`Empty` grid of the given dimensions.
    ///
    /// # Panics
    /// Panics if either dimension is not strictly positive.
    pub fn open(rows: i32, cols: i32) -> Self {
        assert!(rows > 0 && cols > 0, "grid dimensions must be positive");
        Self {
            rows,
            cols,
            cells: vec![Cell::new(CellKind::Empty); (rows * cols) as usize],
        }
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    #[inline]
    pub fn rows(&self) -> i32 {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> i32 {
        self.cols
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// `true` if `pos` lies inside the grid.
    #[inline]
    pub fn in_bounds(&self, pos: Position) -> bool {
        (0..self.rows).contains(&pos.row) && (0..self.cols).contains(&pos.col)
    }

    /// Row-major index of an in-bounds position.
    #[inline]
    fn idx(&self, pos: Position) -> usize {
        debug_assert!(self.in_bounds(pos), "position {pos} out of bounds");
        (pos.row * self.cols + pos.col) as usize
    }

    // ── Cell queries ──────────────────────────────────────────────────────

    /// The cell at `pos`.
    ///
    /// # Panics
    /// Panics in debug mode if `pos` is out of bounds — callers bound-check
    /// first via [`in_bounds`](Self::in_bounds) or the `is_*` helpers.
    #[inline]
    pub fn cell(&self, pos: Position) -> &Cell {
        &self.cells[self.idx(pos)]
    }

    /// The static kind of the cell at `pos`.
    #[inline]
    pub fn kind(&self, pos: Position) -> CellKind {
        self.cell(pos).kind
    }

    /// The agent standing at `pos`, if any (out of bounds reads as vacant).
    #[inline]
    pub fn occupant(&self, pos: Position) -> Option<AgentId> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.cell(pos).occupant
    }

    /// Bounds check AND kind membership — the accessibility predicate used
    /// by guide-field computation.
    pub fn is_accessible(&self, pos: Position, kinds: &[CellKind]) -> bool {
        self.in_bounds(pos) && kinds.contains(&self.kind(pos))
    }

    /// `true` if `pos` is an in-bounds open-floor cell (ignores occupancy).
    ///
    /// This is the transit predicate of the time-expanded search: facilities
    /// and obstacles are never intermediate waypoints.
    #[inline]
    pub fn is_free(&self, pos: Position) -> bool {
        self.in_bounds(pos) && self.kind(pos) == CellKind::Empty
    }

    /// `true` if `pos` is open floor with no agent on it.
    #[inline]
    pub fn is_empty(&self, pos: Position) -> bool {
        self.is_free(pos) && self.cell(pos).occupant.is_none()
    }

    /// Directions whose neighbouring cell is empty (free and unoccupied),
    /// in canonical enumeration order.
    ///
    /// The fallback candidate list for routing an agent that has no guide
    /// field.
    pub fn empty_directions(&self, pos: Position) -> Vec<Direction> {
        MOVE_DIRECTIONS
            .into_iter()
            .filter(|&d| self.is_empty(pos.step(d)))
            .collect()
    }

    // ── Geometry ──────────────────────────────────────────────────────────

    /// The cell one step from `pos` in `dir`.  Pure arithmetic; the result
    /// may be out of bounds.
    #[inline]
    pub fn step(&self, pos: Position, dir: Direction) -> Position {
        pos.step(dir)
    }

    /// The cell from which a step in `dir` reaches `pos`.
    /// Satisfies `step_back(step(p, d), d) == p`.
    #[inline]
    pub fn step_back(&self, pos: Position, dir: Direction) -> Position {
        pos.step_back(dir)
    }

    // ── Construction & occupancy mutation ─────────────────────────────────

    /// Set the static kind of a cell (construction-time only).
    pub fn set_kind(&mut self, pos: Position, kind: CellKind) {
        let i = self.idx(pos);
        self.cells[i].kind = kind;
    }

    /// Put `agent` on the cell at `pos`.
    ///
    /// Invariant: the cell must be vacant — two agents in one cell means the
    /// caller's serialization discipline is broken.
    pub fn place(&mut self, agent: AgentId, pos: Position) {
        let i = self.idx(pos);
        debug_assert!(
            self.cells[i].occupant.is_none(),
            "cell {pos} already occupied by {:?}",
            self.cells[i].occupant
        );
        self.cells[i].occupant = Some(agent);
    }

    /// Vacate the cell at `pos`, returning the agent that stood there.
    pub fn remove(&mut self, pos: Position) -> Option<AgentId> {
        let i = self.idx(pos);
        self.cells[i].occupant.take()
    }
}

impl std::fmt::Display for Grid {
    /// Render the static layout, one symbol per cell (occupancy not shown).
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                write!(f, "{}", self.kind(Position::new(row, col)).symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
