//! Roster-loading error type.

use thiserror::Error;

/// Errors produced by the CSV roster loader.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("roster parse error: {0}")]
    Parse(String),
}

pub type RosterResult<T> = Result<T, RosterError>;
