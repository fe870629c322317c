//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use agv_agent::AgentStore;
use agv_core::{Direction, Tick};
use agv_grid::ReservationTable;
use agv_sim::{SimObserver, TickStats};

use crate::row::{AgentSnapshotRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::OutputError;

/// A [`SimObserver`] that writes agent snapshots and tick summaries to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver`
/// methods have no return value.  After `sim.run()` returns, check for
/// errors with [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer: W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

fn heading_letter(dir: Direction) -> char {
    match dir {
        Direction::North => 'N',
        Direction::East  => 'E',
        Direction::South => 'S',
        Direction::West  => 'W',
        Direction::Still => '-',
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, stats: &TickStats) {
        let row = TickSummaryRow {
            tick:    tick.0,
            moved:   stats.moved as u64,
            blocked: stats.blocked as u64,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, agents: &AgentStore, _reservations: &ReservationTable) {
        let rows: Vec<AgentSnapshotRow> = (0..agents.count)
            .map(|i| AgentSnapshotRow {
                agent_id: i as u32,
                tick:     tick.0,
                row:      agents.position[i].row,
                col:      agents.position[i].col,
                heading:  heading_letter(agents.direction[i]),
                has_plan: !agents.plan[i].is_empty(),
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
