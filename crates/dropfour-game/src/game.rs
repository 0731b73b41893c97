//! The per-game state machine, free of channels, timers, and I/O.
//!
//! `Game` is pure data plus transitions. The actor owns one and applies
//! commands to it; tests drive it directly.

use dropfour_board::{Board, BoardError, Cell, Seat};
use dropfour_protocol::{ConnectionId, GameId, GameSnapshot, GameStatus, ParticipantId, PlayerView};

use crate::error::GameError;
use crate::store::GameRecord;
use crate::types::{GameUpdate, MoveRecord, Outcome, Participant, Turn, now_ms};

fn seat_index(seat: Seat) -> usize {
    match seat {
        Seat::One => 0,
        Seat::Two => 1,
    }
}

/// One Connect Four session: two seats, a board, and whose move it is.
///
/// Seat one always belongs to the first participant passed to [`new`]
/// and always opens the game.
///
/// [`new`]: Game::new
pub struct Game {
    id: GameId,
    seats: [Participant; 2],
    board: Board,
    turn: Turn,
    status: GameStatus,
    outcome: Option<Outcome>,
    moves: Vec<MoveRecord>,
    started_at_ms: u64,
    last_move_at_ms: u64,
    ended_at_ms: Option<u64>,
}

impl Game {
    pub fn new(id: GameId, first: Participant, second: Participant) -> Self {
        let seats = [first, second];
        let turn = Self::turn_of(&seats, Seat::One);
        let at = now_ms();
        Self {
            id,
            seats,
            board: Board::new(),
            turn,
            status: GameStatus::Active,
            outcome: None,
            moves: Vec::new(),
            started_at_ms: at,
            last_move_at_ms: at,
            ended_at_ms: None,
        }
    }

    fn turn_of(seats: &[Participant; 2], seat: Seat) -> Turn {
        if seats[seat_index(seat)].is_automated() {
            Turn::Automated(seat)
        } else {
            Turn::Human(seat)
        }
    }

    pub fn id(&self) -> &GameId {
        &self.id
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, GameStatus::Active)
    }

    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn participant(&self, seat: Seat) -> &Participant {
        &self.seats[seat_index(seat)]
    }

    pub(crate) fn participant_mut(&mut self, seat: Seat) -> &mut Participant {
        &mut self.seats[seat_index(seat)]
    }

    /// The seat whose live connection is `conn`, if any.
    pub fn seat_of_conn(&self, conn: ConnectionId) -> Option<Seat> {
        [Seat::One, Seat::Two].into_iter().find(|&seat| {
            self.participant(seat)
                .link
                .as_ref()
                .is_some_and(|link| link.conn == conn)
        })
    }

    pub fn seat_of_username(&self, username: &str) -> Option<Seat> {
        [Seat::One, Seat::Two]
            .into_iter()
            .find(|&seat| self.participant(seat).username == username)
    }

    pub fn seat_of_participant(&self, id: ParticipantId) -> Option<Seat> {
        [Seat::One, Seat::Two]
            .into_iter()
            .find(|&seat| self.participant(seat).id == id)
    }

    /// Applies a move for `seat`, advancing or finishing the game.
    ///
    /// The caller has already established that `seat` is allowed to move
    /// (connection check, automated check); this enforces only the game
    /// rules. The board is untouched on any error.
    pub fn apply_move(&mut self, seat: Seat, column: usize) -> Result<GameUpdate, GameError> {
        if !self.is_active() {
            return Err(GameError::NotActive);
        }
        if self.turn.seat() != seat {
            return Err(GameError::NotYourTurn);
        }
        let row = match self.board.drop_piece(column, seat) {
            Ok(row) => row,
            Err(BoardError::ColumnOutOfRange { .. }) => return Err(GameError::ColumnOutOfRange),
            Err(BoardError::ColumnFull { .. }) => return Err(GameError::ColumnFull),
        };

        let at = now_ms();
        self.moves.push(MoveRecord {
            seat,
            column,
            row,
            at_ms: at,
        });
        self.last_move_at_ms = at;

        if self.board.check_win(row, column) {
            self.finish(Outcome::Winner(seat));
        } else if self.board.is_full() {
            self.finish(Outcome::Draw);
        } else {
            self.turn = Self::turn_of(&self.seats, seat.other());
        }
        Ok(self.update())
    }

    /// Ends the game with `loser`'s opponent as the winner.
    pub fn forfeit(&mut self, loser: Seat) -> Result<GameUpdate, GameError> {
        if !self.is_active() {
            return Err(GameError::NotActive);
        }
        self.finish(Outcome::Winner(loser.other()));
        Ok(self.update())
    }

    fn finish(&mut self, outcome: Outcome) {
        self.status = GameStatus::Finished;
        self.outcome = Some(outcome);
        self.ended_at_ms = Some(now_ms());
    }

    pub fn update(&self) -> GameUpdate {
        GameUpdate {
            status: self.status,
            turn: self.turn,
            board: self.board,
        }
    }

    /// The wire-facing view: cells carry their owner's username, and
    /// `winner` is a username or the literal `"draw"`.
    pub fn snapshot(&self) -> GameSnapshot {
        let board = self
            .board
            .grid()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Cell::Filled(seat) => {
                            Some(self.participant(*seat).username.clone())
                        }
                        Cell::Empty => None,
                    })
                    .collect()
            })
            .collect();

        GameSnapshot {
            id: self.id.clone(),
            board,
            current_player: self.participant(self.turn.seat()).username.clone(),
            player1: self.player_view(Seat::One),
            player2: self.player_view(Seat::Two),
            status: self.status,
            winner: self.winner_name(),
        }
    }

    fn player_view(&self, seat: Seat) -> PlayerView {
        let p = self.participant(seat);
        PlayerView {
            username: p.username.clone(),
            is_bot: p.is_automated(),
        }
    }

    fn winner_name(&self) -> Option<String> {
        self.outcome.map(|outcome| match outcome {
            Outcome::Winner(seat) => self.participant(seat).username.clone(),
            Outcome::Draw => "draw".to_owned(),
        })
    }

    /// The persistence view. Meaningful once the game has finished;
    /// `winner` is empty for an active game.
    pub fn record(&self) -> GameRecord {
        let ended_at_ms = self.ended_at_ms.unwrap_or(self.last_move_at_ms);
        GameRecord {
            id: self.id.clone(),
            player1: self.participant(Seat::One).username.clone(),
            player2: self.participant(Seat::Two).username.clone(),
            winner: self.winner_name().unwrap_or_default(),
            status: self.status,
            started_at_ms: self.started_at_ms,
            ended_at_ms,
            duration_secs: ended_at_ms.saturating_sub(self.started_at_ms) / 1000,
            moves: self.moves.clone(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
