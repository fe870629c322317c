//! Character-map layout parser.
//!
//! # Format
//!
//! One line per grid row, one character per cell:
//!
//! ```text
//! .....
//! .#R#.
//! .#G#.
//! ..S..
//! ```
//!
//! | Symbol | Cell kind  |
//! |--------|------------|
//! | `.`    | `Empty`    |
//! | `#`    | `Obstacle` |
//! | `R`    | `Rack`     |
//! | `G`    | `Gate`     |
//! | `S`    | `Station`  |
//!
//! Blank lines and leading/trailing whitespace-only lines are ignored; all
//! remaining rows must have equal length.

use std::path::Path;

use agv_core::Position;

use crate::cell::CellKind;
use crate::error::{LayoutError, LayoutResult};
use crate::grid::Grid;

/// Parse a layout string into a [`Grid`] (all cells vacant).
pub fn parse_layout(text: &str) -> LayoutResult<Grid> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(LayoutError::Empty);
    }

    let cols = lines[0].chars().count();
    for (row, line) in lines.iter().enumerate() {
        let got = line.chars().count();
        if got != cols {
            return Err(LayoutError::RaggedRow { row, got, expected: cols });
        }
    }

    let mut grid = Grid::open(lines.len() as i32, cols as i32);
    for (row, line) in lines.iter().enumerate() {
        for (col, symbol) in line.chars().enumerate() {
            let kind = kind_for(symbol)
                .ok_or(LayoutError::UnknownSymbol { symbol, row, col })?;
            grid.set_kind(Position::new(row as i32, col as i32), kind);
        }
    }

    Ok(grid)
}

/// Load a layout file from disk.
pub fn load_layout(path: &Path) -> LayoutResult<Grid> {
    let text = std::fs::read_to_string(path)?;
    parse_layout(&text)
}

fn kind_for(symbol: char) -> Option<CellKind> {
    match symbol {
        '.' => Some(CellKind::Empty),
        '#' => Some(CellKind::Obstacle),
        'R' => Some(CellKind::Rack),
        'G' => Some(CellKind::Gate),
        'S' => Some(CellKind::Station),
        _ => None,
    }
}
