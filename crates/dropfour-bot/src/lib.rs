//! The automated opponent's column chooser.
//!
//! A deliberately shallow policy (one ply of lookahead plus the static
//! evaluator): strong enough to punish blunders, weak enough to lose.
//! The precedence is a behavioral contract (clients and tests observe
//! it), not a tuning detail:
//!
//! 1. deny an immediate opponent win,
//! 2. take an immediate own win,
//! 3. maximize `evaluate` after the drop plus a center-proximity bonus.
//!
//! Ties and multiple threats resolve to the leftmost column, because
//! every scan walks [`Board::legal_columns`] in order and only a strict
//! improvement displaces the current best.
//!
//! Pure and synchronous: pacing delays and turn bookkeeping live in the
//! server layer.

use dropfour_board::{Board, Seat};

/// Center column index on the 7-wide board.
const CENTER_COLUMN: i32 = 3;

/// Bonus per step of center proximity in the heuristic ranking.
const CENTER_BONUS: i32 = 5;

/// Picks a column for `seat` to drop into, or `None` when the board has
/// no legal column (callers finish a full game as a draw before the
/// policy would ever see it).
pub fn choose_column(board: &Board, seat: Seat) -> Option<usize> {
    let legal = board.legal_columns();
    if legal.is_empty() {
        return None;
    }
    let opponent = seat.other();

    // A threatened opponent win outranks taking our own: the policy
    // plays one move, and losing on the reply nullifies any win we
    // could have set up.
    if let Some(col) = legal
        .iter()
        .copied()
        .find(|&col| wins_if_dropped(board, col, opponent))
    {
        return Some(col);
    }

    if let Some(col) = legal
        .iter()
        .copied()
        .find(|&col| wins_if_dropped(board, col, seat))
    {
        return Some(col);
    }

    let mut best_score = i32::MIN;
    let mut best_column = legal[0];
    for col in legal {
        let mut probe = *board;
        if probe.drop_piece(col, seat).is_err() {
            continue;
        }
        let center_distance = (col as i32 - CENTER_COLUMN).abs();
        let score = probe.evaluate(seat) + (CENTER_COLUMN - center_distance) * CENTER_BONUS;
        if score > best_score {
            best_score = score;
            best_column = col;
        }
    }
    Some(best_column)
}

/// Whether dropping into `column` ends the game for `seat`.
fn wins_if_dropped(board: &Board, column: usize, seat: Seat) -> bool {
    let mut probe = *board;
    match probe.drop_piece(column, seat) {
        Ok(row) => probe.check_win(row, column),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropfour_board::ROWS;

    /// The policy plays `seat`; the human opponent is the other seat.
    const BOT: Seat = Seat::Two;
    const HUMAN: Seat = Seat::One;

    fn board_with(drops: &[(usize, Seat)]) -> Board {
        let mut board = Board::new();
        for &(col, seat) in drops {
            board.drop_piece(col, seat).unwrap();
        }
        board
    }

    #[test]
    fn test_empty_board_prefers_center() {
        let board = Board::new();
        assert_eq!(choose_column(&board, BOT), Some(3));
    }

    #[test]
    fn test_blocks_vertical_threat() {
        let board = board_with(&[(0, HUMAN), (0, HUMAN), (0, HUMAN)]);
        assert_eq!(choose_column(&board, BOT), Some(0));
    }

    #[test]
    fn test_blocks_horizontal_threat() {
        // _ X X X _ on the bottom row: 0 and 4 both complete it; the
        // scan finds 0 first.
        let board = board_with(&[(1, HUMAN), (2, HUMAN), (3, HUMAN)]);
        assert_eq!(choose_column(&board, BOT), Some(0));
    }

    #[test]
    fn test_takes_own_winning_column() {
        let board = board_with(&[(6, BOT), (6, BOT), (6, BOT)]);
        assert_eq!(choose_column(&board, BOT), Some(6));
    }

    #[test]
    fn test_blocking_outranks_winning() {
        // Both sides have a vertical three; the opponent's is denied
        // even though column 6 would win outright.
        let board = board_with(&[
            (0, HUMAN),
            (6, BOT),
            (0, HUMAN),
            (6, BOT),
            (0, HUMAN),
            (6, BOT),
        ]);
        assert_eq!(choose_column(&board, BOT), Some(0));
    }

    #[test]
    fn test_two_threats_resolve_leftmost() {
        // Vertical threes in columns 1 and 5: only one can be stopped,
        // and the scan commits to the leftmost.
        let board = board_with(&[
            (1, HUMAN),
            (2, BOT),
            (1, HUMAN),
            (3, BOT),
            (1, HUMAN),
            (5, HUMAN),
            (4, BOT),
            (5, HUMAN),
            (2, BOT),
            (5, HUMAN),
        ]);
        assert_eq!(choose_column(&board, BOT), Some(1));
    }

    #[test]
    fn test_never_picks_a_full_column() {
        let mut board = Board::new();
        for i in 0..ROWS {
            let seat = if i % 2 == 0 { HUMAN } else { BOT };
            board.drop_piece(3, seat).unwrap();
        }
        let choice = choose_column(&board, BOT).unwrap();
        assert_ne!(choice, 3);
        assert!(board.legal_columns().contains(&choice));
    }

    #[test]
    fn test_full_board_yields_none() {
        let mut board = Board::new();
        for col in 0..7 {
            for i in 0..ROWS {
                let seat = if (i / 2 + col) % 2 == 0 { HUMAN } else { BOT };
                board.drop_piece(col, seat).unwrap();
            }
        }
        assert_eq!(choose_column(&board, BOT), None);
    }
}
