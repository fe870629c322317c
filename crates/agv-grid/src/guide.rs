//! Per-destination guide fields.
//!
//! A guide field is the precomputed answer to "from this cell, which way to
//! the destination, and how far?" — one reverse breadth-first search per
//! (destination, passable-kind-set) pair, then O(1) lookups for every agent
//! heading there.  Callers cache and share fields (via `Arc`) per logical
//! target; the field itself is immutable once computed and must be
//! recomputed if the obstacle layout changes.

use std::collections::VecDeque;

use agv_core::{Direction, Position, MOVE_DIRECTIONS};

use crate::cell::CellKind;
use crate::grid::Grid;

/// Sentinel distance for cells that cannot reach the destination.
const UNREACHABLE: u32 = u32::MAX;

/// A distance + direction field toward one destination cell.
///
/// `distance[p]` is the hop count from `p` to the destination along passable
/// cells (`u32::MAX` = unreachable); `direction[p]` is a direction whose
/// step from `p` decreases the distance by one.  When several directions
/// tie, the one discovered first in canonical enumeration order wins — any
/// minimizing direction is acceptable.
pub struct GuideField {
    rows: i32,
    cols: i32,
    destination: Position,
    distance: Vec<u32>,
    direction: Vec<Direction>,
}

impl GuideField {
    /// Compute the field for `destination` over `grid`.
    ///
    /// `passable` is the set of cell kinds the field may flow through; it is
    /// distinct from the destination's own kind — the destination cell is
    /// seeded unconditionally, since targets are usually facilities (racks,
    /// gates, stations) that are not themselves transitable.
    ///
    /// Reverse BFS: expanding a cell `cur` asks, for every direction `d`,
    /// which cell `prv` would reach `cur` by a forward step in `d`.  FIFO
    /// order with unit edges yields exact shortest hop distances in
    /// O(cells).
    ///
    /// # Panics
    /// Panics if `destination` is out of bounds (programmer error).
    pub fn compute(grid: &Grid, destination: Position, passable: &[CellKind]) -> Self {
        assert!(
            grid.in_bounds(destination),
            "guide destination {destination} out of bounds"
        );

        let (rows, cols) = (grid.rows(), grid.cols());
        let mut field = Self {
            rows,
            cols,
            destination,
            distance: vec![UNREACHABLE; (rows * cols) as usize],
            direction: vec![Direction::Still; (rows * cols) as usize],
        };

        let mut queue = VecDeque::new();
        let dst_idx = field.idx(destination);
        field.distance[dst_idx] = 0;
        queue.push_back(destination);

        while let Some(cur) = queue.pop_front() {
            let dist = field.distance[field.idx(cur)];

            for dir in MOVE_DIRECTIONS {
                // The cell from which a forward step in `dir` lands on `cur`.
                let prv = grid.step_back(cur, dir);

                if !grid.is_accessible(prv, passable) {
                    continue;
                }
                let i = field.idx(prv);
                if field.distance[i] != UNREACHABLE {
                    continue;
                }

                field.distance[i] = dist + 1;
                field.direction[i] = dir;
                queue.push_back(prv);
            }
        }

        field
    }

    #[inline]
    fn idx(&self, pos: Position) -> usize {
        (pos.row * self.cols + pos.col) as usize
    }

    #[inline]
    fn in_bounds(&self, pos: Position) -> bool {
        (0..self.rows).contains(&pos.row) && (0..self.cols).contains(&pos.col)
    }

    /// The destination this field guides toward.
    #[inline]
    pub fn destination(&self) -> Position {
        self.destination
    }

    /// Hop distance from `pos` to the destination.
    ///
    /// Out-of-bounds and unreachable cells both read as `u32::MAX`, so a
    /// plain `<` comparison against a neighbour's distance does the right
    /// thing at the grid edge.
    #[inline]
    pub fn distance(&self, pos: Position) -> u32 {
        if !self.in_bounds(pos) {
            return UNREACHABLE;
        }
        self.distance[self.idx(pos)]
    }

    /// The descent direction recorded for `pos` (`Still` if unreachable).
    #[inline]
    pub fn direction(&self, pos: Position) -> Direction {
        if !self.in_bounds(pos) {
            return Direction::Still;
        }
        self.direction[self.idx(pos)]
    }

    /// `true` if the destination is reachable from `pos`.
    #[inline]
    pub fn is_reachable(&self, pos: Position) -> bool {
        self.distance(pos) != UNREACHABLE
    }

    /// Candidate move directions out of `pos`, ordered by ascending distance
    /// of the neighbouring cell; ties keep canonical enumeration order.
    ///
    /// Neighbours that cannot reach the destination at all are omitted —
    /// routing must never move into or through an unreachable cell.
    pub fn guide_directions(&self, pos: Position) -> Vec<Direction> {
        let mut candidates: Vec<(u32, Direction)> = MOVE_DIRECTIONS
            .into_iter()
            .filter_map(|d| {
                let dist = self.distance(pos.step(d));
                (dist != UNREACHABLE).then_some((dist, d))
            })
            .collect();
        // Stable sort preserves enumeration order among equal distances.
        candidates.sort_by_key(|&(dist, _)| dist);
        candidates.into_iter().map(|(_, d)| d).collect()
    }
}
