//! `agv-output` — simulation trace writers for the rust_agv framework.
//!
//! The CSV backend creates two files:
//!
//! | File                  | One row per …                     |
//! |-----------------------|-----------------------------------|
//! | `agent_snapshots.csv` | agent, per snapshot interval      |
//! | `tick_summaries.csv`  | tick                              |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `agv_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use agv_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run(&mut obs);
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{AgentSnapshotRow, TickSummaryRow};
pub use writer::OutputWriter;
