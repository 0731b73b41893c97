//! Error types for board operations.

/// Why a drop was refused. The board is never modified on error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The column index is outside `0..COLS`. Malformed input, not a
    /// game situation.
    #[error("column {column} is out of range")]
    ColumnOutOfRange { column: usize },

    /// The column exists but all six cells are taken.
    #[error("column {column} is full")]
    ColumnFull { column: usize },
}
