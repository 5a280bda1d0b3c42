//! Error types for gridplan.

use thiserror::Error;

use crate::geom::{Bounds, Cell};

/// Everything that can go wrong while building a planning request or
/// running a search over it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Occupancy rows are not all the same length.
    #[error("invalid grid: row {row} has {found} columns, expected {expected}")]
    InvalidGrid {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A text map contains a character that is neither free nor blocked.
    #[error("invalid grid: unexpected character {ch:?} at {cell}")]
    InvalidCell { ch: char, cell: Cell },

    /// A cell lies outside the grid extents.
    #[error("cell {cell} is outside the {}x{} grid", .bounds.rows, .bounds.cols)]
    OutOfBounds { cell: Cell, bounds: Bounds },

    /// No path exists between two cells under the current occupancy.
    #[error("no path from {from} to {to}")]
    NotFound { from: Cell, to: Cell },

    /// Backward chaining stopped without reaching a goal condition.
    #[error("backward chaining from {goal} exhausted after {steps} steps")]
    ChainExhausted { goal: Cell, steps: usize },

    /// The search expanded more cells than its configured budget allows.
    #[error("search aborted after {expansions} expansions")]
    BudgetExceeded { expansions: usize },

    /// The caller raised the cancellation token.
    #[error("search cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
