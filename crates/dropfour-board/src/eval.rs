//! Static positional evaluation.
//!
//! The score is a sum over every in-bounds window of four cells on all
//! four axes. A window containing both seats is dead and scores zero;
//! otherwise the payoff scales with how close the window is to complete:
//!
//! | window contents            | payoff  |
//! |----------------------------|---------|
//! | four own                   | +10000  |
//! | four opponent              | -10000  |
//! | three own, one empty       | +1000   |
//! | three opponent, one empty  | -1000   |
//! | two own, two empty         | +100    |
//! | two opponent, two empty    | -100    |
//! | anything else (unblocked)  | ±10/pc  |
//!
//! Purely material: no search, no tempo. The bot layer adds its own
//! center bias on top of this number.

use crate::grid::AXES;
use crate::{Board, COLS, Cell, ROWS, Seat, WIN_LENGTH};

impl Board {
    /// Positional score of the whole board from `seat`'s point of view.
    ///
    /// Antisymmetric by construction: `evaluate(s) == -evaluate(s.other())`.
    pub fn evaluate(&self, seat: Seat) -> i32 {
        let mut score = 0;
        for row in 0..ROWS {
            for col in 0..COLS {
                for &(dr, dc) in &AXES {
                    score += self.window_score(row, col, dr, dc, seat);
                }
            }
        }
        score
    }

    /// Payoff of the length-4 window starting at (row, col) along
    /// (dr, dc); zero when the window leaves the grid.
    fn window_score(&self, row: usize, col: usize, dr: isize, dc: isize, seat: Seat) -> i32 {
        let mut own = 0;
        let mut opp = 0;
        let mut empty = 0;
        for i in 0..WIN_LENGTH as isize {
            let Some(cell) = self.signed_get(row as isize + i * dr, col as isize + i * dc) else {
                return 0;
            };
            match cell {
                Cell::Empty => empty += 1,
                Cell::Filled(s) if s == seat => own += 1,
                Cell::Filled(_) => opp += 1,
            }
        }
        match (own, opp, empty) {
            _ if own > 0 && opp > 0 => 0,
            (4, _, _) => 10_000,
            (_, 4, _) => -10_000,
            (_, 3, 1) => -1_000,
            (3, _, 1) => 1_000,
            (2, _, 2) => 100,
            (_, 2, 2) => -100,
            _ => own * 10 - opp * 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(drops: &[(usize, Seat)]) -> Board {
        let mut board = Board::new();
        for &(col, seat) in drops {
            board.drop_piece(col, seat).unwrap();
        }
        board
    }

    #[test]
    fn test_empty_board_scores_zero() {
        let board = Board::new();
        assert_eq!(board.evaluate(Seat::One), 0);
        assert_eq!(board.evaluate(Seat::Two), 0);
    }

    #[test]
    fn test_single_piece_scores_positive_for_owner() {
        let board = board_with(&[(3, Seat::One)]);
        assert!(board.evaluate(Seat::One) > 0);
        assert!(board.evaluate(Seat::Two) < 0);
    }

    #[test]
    fn test_evaluation_is_antisymmetric() {
        let board = board_with(&[
            (3, Seat::One),
            (3, Seat::Two),
            (2, Seat::One),
            (4, Seat::Two),
            (5, Seat::One),
            (0, Seat::Two),
        ]);
        assert_eq!(board.evaluate(Seat::One), -board.evaluate(Seat::Two));
    }

    #[test]
    fn test_open_three_scores_at_least_a_thousand() {
        let board = board_with(&[(0, Seat::One), (1, Seat::One), (2, Seat::One)]);
        assert!(board.evaluate(Seat::One) >= 1000);
    }

    #[test]
    fn test_completed_four_dominates_the_score() {
        let board = board_with(&[
            (0, Seat::One),
            (1, Seat::One),
            (2, Seat::One),
            (3, Seat::One),
        ]);
        assert!(board.evaluate(Seat::One) >= 10_000);
        assert!(board.evaluate(Seat::Two) <= -10_000);
    }

    #[test]
    fn test_blocked_three_is_worth_less_than_open_three() {
        let open = board_with(&[(0, Seat::One), (1, Seat::One), (2, Seat::One)]);
        let blocked = board_with(&[
            (0, Seat::One),
            (1, Seat::One),
            (2, Seat::One),
            (3, Seat::Two),
        ]);
        assert!(blocked.evaluate(Seat::One) < open.evaluate(Seat::One));
    }

    #[test]
    fn test_center_column_outscores_edge() {
        // More windows pass through the center, so the same single piece
        // is worth more there.
        let center = board_with(&[(3, Seat::One)]);
        let edge = board_with(&[(0, Seat::One)]);
        assert!(center.evaluate(Seat::One) > edge.evaluate(Seat::One));
    }
}
