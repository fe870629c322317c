//! Grid-subsystem error type.

use thiserror::Error;

/// Errors produced by `agv-grid` (layout parsing).
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout has no rows")]
    Empty,

    #[error("layout row {row} has {got} cells, expected {expected}")]
    RaggedRow { row: usize, got: usize, expected: usize },

    #[error("unknown layout symbol {symbol:?} at row {row}, col {col}")]
    UnknownSymbol { symbol: char, row: usize, col: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type LayoutResult<T> = Result<T, LayoutError>;
