//! Connect Four board mechanics for dropfour.
//!
//! A pure crate: no async, no I/O, no clocks. Everything here is a
//! deterministic function of the grid, which is what makes the game
//! layer's races testable (the board can't hide state).
//!
//! - [`Board`]: the 6×7 grid with gravity drops, win detection over the
//!   placed cell, and fullness/legality queries.
//! - [`Seat`] / [`Cell`]: closed types for the two sides and the three
//!   cell states. No string sentinels anywhere.
//! - [`Board::evaluate`]: the additive positional score the bot's
//!   heuristic ranks candidate columns with.
//!
//! Grid dimensions are constants, not configuration: every consumer
//! (client rendering, win scan, evaluation windows) assumes 6×7×4.

mod error;
mod eval;
mod grid;

pub use error::BoardError;
pub use grid::{Board, Cell, Seat};

/// Number of rows. Row 0 is the top; pieces stack from row 5 upward.
pub const ROWS: usize = 6;

/// Number of columns, addressed 0..=6 left to right.
pub const COLS: usize = 7;

/// Contiguous pieces needed to win.
pub const WIN_LENGTH: usize = 4;
