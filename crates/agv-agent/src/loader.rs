//! CSV roster loader.
//!
//! # CSV format
//!
//! One row per agent; ids are assigned by row order, starting at 0.
//!
//! ```csv
//! row,col,direction,priority
//! 0,0,east,0
//! 1,0,north,1
//! 3,4,south,2
//! ```
//!
//! `direction` is one of `north | east | south | west` (case-insensitive).
//! `still` is deliberately not accepted: a planless agent may idle, but an
//! agent must always *face* somewhere for rotation actions to be
//! meaningful.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use agv_core::{Direction, Position};

use crate::error::{RosterError, RosterResult};
use crate::store::AgentSpec;

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RosterRecord {
    row:       i32,
    col:       i32,
    direction: String,
    priority:  u32,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load agent specs from a CSV file.
pub fn load_roster_csv(path: &Path) -> RosterResult<Vec<AgentSpec>> {
    let file = std::fs::File::open(path).map_err(RosterError::Io)?;
    load_roster_reader(file)
}

/// Like [`load_roster_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`).
pub fn load_roster_reader<R: Read>(reader: R) -> RosterResult<Vec<AgentSpec>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut specs = Vec::new();

    for result in csv_reader.deserialize::<RosterRecord>() {
        let record = result.map_err(|e| RosterError::Parse(e.to_string()))?;
        specs.push(AgentSpec {
            position:  Position::new(record.row, record.col),
            direction: parse_direction(&record.direction)?,
            priority:  record.priority,
        });
    }

    Ok(specs)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_direction(s: &str) -> RosterResult<Direction> {
    match s.trim().to_ascii_lowercase().as_str() {
        "north" => Ok(Direction::North),
        "east"  => Ok(Direction::East),
        "south" => Ok(Direction::South),
        "west"  => Ok(Direction::West),
        other => Err(RosterError::Parse(format!(
            "invalid direction {other:?}: expected north, east, south, or west"
        ))),
    }
}
