//! Error types for the session layer.

use dropfour_protocol::GameId;

/// Errors surfaced by game operations.
///
/// The `Display` strings are pushed to clients verbatim inside `error`
/// messages, so they are part of the wire contract and must not change
/// casually.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// No game registered under this id.
    #[error("Game not found")]
    NotFound(GameId),

    /// The game has already finished.
    #[error("Game is not active")]
    NotActive,

    /// The requester is not the to-move participant. Also returned when
    /// the automated side is to move, or when the to-move seat has no
    /// bound connection.
    #[error("Not your turn")]
    NotYourTurn,

    /// Column index outside the grid.
    #[error("Invalid column")]
    ColumnOutOfRange,

    /// All six cells of the column are taken.
    #[error("Column is full")]
    ColumnFull,

    /// No reconnect window is open for this participant, or it has
    /// already expired.
    #[error("Reconnection window expired")]
    NoReconnectWindow,

    /// The username does not belong to either seat of this game.
    #[error("Username does not match this game")]
    UsernameMismatch,

    /// The game's command channel closed mid-operation: the game ended
    /// and its actor stopped. Clients see the same text as `NotFound`
    /// because from their side the game is simply gone.
    #[error("Game not found")]
    Unavailable(GameId),
}
