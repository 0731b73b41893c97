//! The grid itself: seats, cells, drops, and the win scan.

use serde::{Deserialize, Serialize};

use crate::{BoardError, COLS, ROWS, WIN_LENGTH};

/// One of the two sides of a game.
///
/// Seats are positional (first-seated side is `One` and moves first);
/// everything player-facing (usernames, bot flags) lives a layer up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seat {
    One,
    Two,
}

impl Seat {
    /// The opposing seat.
    pub fn other(self) -> Seat {
        match self {
            Seat::One => Seat::Two,
            Seat::Two => Seat::One,
        }
    }
}

/// One grid cell. Closed: either empty or owned by a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Filled(Seat),
}

impl Cell {
    /// Whether the cell holds a piece.
    pub fn is_filled(self) -> bool {
        matches!(self, Cell::Filled(_))
    }
}

/// The four scan axes: horizontal, vertical, both diagonals.
/// Each axis is walked in both directions from the placed cell.
pub(crate) const AXES: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// The 6×7 playing grid.
///
/// `Copy` on purpose: the bot simulates candidate moves on throwaway
/// copies, and move results carry a board copy out of the game actor so
/// callers never need to query it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; COLS]; ROWS],
        }
    }

    /// The raw grid, row 0 at the top. Used for building client views.
    pub fn grid(&self) -> &[[Cell; COLS]; ROWS] {
        &self.cells
    }

    /// The cell at (row, col), or `None` out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Drops a piece for `seat` into `column` and returns the landing
    /// row. The board is unchanged on error.
    ///
    /// # Errors
    /// [`BoardError::ColumnOutOfRange`] for columns past the grid,
    /// [`BoardError::ColumnFull`] when all six cells are taken. The two
    /// are distinct: a client picking column 9 is malformed input, a
    /// client picking a full column just mis-timed a legal one.
    pub fn drop_piece(&mut self, column: usize, seat: Seat) -> Result<usize, BoardError> {
        if column >= COLS {
            return Err(BoardError::ColumnOutOfRange { column });
        }
        // Gravity: lowest empty cell wins, scanning bottom row upward.
        for row in (0..ROWS).rev() {
            if self.cells[row][column] == Cell::Empty {
                self.cells[row][column] = Cell::Filled(seat);
                return Ok(row);
            }
        }
        Err(BoardError::ColumnFull { column })
    }

    /// Whether the piece at (row, col) completes a run of four.
    ///
    /// Scans all four axes through the cell, counting contiguous
    /// same-seat pieces in both directions. Only the just-placed cell
    /// needs checking: any new run must pass through it. Returns `false`
    /// for an empty or out-of-bounds cell.
    pub fn check_win(&self, row: usize, col: usize) -> bool {
        let Some(Cell::Filled(seat)) = self.get(row, col) else {
            return false;
        };
        AXES.iter().any(|&(dr, dc)| {
            let run = 1
                + self.count_from(row, col, dr, dc, seat)
                + self.count_from(row, col, -dr, -dc, seat);
            run >= WIN_LENGTH
        })
    }

    /// Contiguous `seat` cells starting one step from (row, col) along
    /// (dr, dc), not counting the origin.
    fn count_from(&self, row: usize, col: usize, dr: isize, dc: isize, seat: Seat) -> usize {
        let mut count = 0;
        let mut r = row as isize + dr;
        let mut c = col as isize + dc;
        while let Some(cell) = self.signed_get(r, c) {
            if cell != Cell::Filled(seat) {
                break;
            }
            count += 1;
            r += dr;
            c += dc;
        }
        count
    }

    pub(crate) fn signed_get(&self, row: isize, col: isize) -> Option<Cell> {
        if row < 0 || col < 0 {
            return None;
        }
        self.get(row as usize, col as usize)
    }

    /// Whether no column can take another piece.
    pub fn is_full(&self) -> bool {
        self.cells[0].iter().all(|c| c.is_filled())
    }

    /// Columns that can take a piece, left to right. Order matters: the
    /// bot breaks score ties toward the first column in this list.
    pub fn legal_columns(&self) -> Vec<usize> {
        (0..COLS)
            .filter(|&col| self.cells[0][col] == Cell::Empty)
            .collect()
    }
}
