//! Typed participants, the turn indicator, and the move log.
//!
//! The original model for this kind of server tends to grow string
//! sentinels ("bot" as a player id, usernames doubling as turn markers).
//! Everything here is an enum instead, so the compiler tracks who can
//! move and who is a machine.

use std::time::{SystemTime, UNIX_EPOCH};

use dropfour_board::{Board, Seat};
use dropfour_protocol::{ConnectionId, GameStatus, ParticipantId, ServerMessage};
use serde::Serialize;
use tokio::sync::mpsc;

/// Channel for pushing server messages to one participant's writer task.
pub type OutboundTx = mpsc::UnboundedSender<ServerMessage>;

/// Distinguishes a seated human from the built-in opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantKind {
    Human,
    Automated,
}

/// The live connection bound to a seat.
///
/// Replaced wholesale on reconnect. Absent while a reconnect window is
/// open, and always absent for the automated participant.
#[derive(Debug, Clone)]
pub struct Link {
    pub conn: ConnectionId,
    pub tx: OutboundTx,
}

/// One seat's occupant for the lifetime of a game.
///
/// The `id` outlives any single socket: a player who drops and comes
/// back keeps their `ParticipantId` while `link` is rebound.
#[derive(Debug, Clone)]
pub struct Participant {
    pub id: ParticipantId,
    pub username: String,
    pub kind: ParticipantKind,
    pub link: Option<Link>,
}

impl Participant {
    /// A human seat, keeping the id they were assigned at matchmaking.
    pub fn human(id: ParticipantId, username: impl Into<String>, link: Link) -> Self {
        Self {
            id,
            username: username.into(),
            kind: ParticipantKind::Human,
            link: Some(link),
        }
    }

    /// The built-in opponent. Has no connection and never gets one.
    pub fn automated(username: impl Into<String>) -> Self {
        Self {
            id: ParticipantId::next(),
            username: username.into(),
            kind: ParticipantKind::Automated,
            link: None,
        }
    }

    pub fn is_automated(&self) -> bool {
        matches!(self.kind, ParticipantKind::Automated)
    }
}

/// Whose move it is, and what kind of mover they are.
///
/// Carrying the kind lets the coordinator decide whether to invoke the
/// opponent policy straight off an update, without another query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Human(Seat),
    Automated(Seat),
}

impl Turn {
    pub fn seat(self) -> Seat {
        match self {
            Turn::Human(seat) | Turn::Automated(seat) => seat,
        }
    }

    pub fn is_automated(self) -> bool {
        matches!(self, Turn::Automated(_))
    }
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner(Seat),
    Draw,
}

/// One applied move, as kept in the game's log and persisted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    pub seat: Seat,
    pub column: usize,
    pub row: usize,
    pub at_ms: u64,
}

/// What an operation hands back to the coordinator: enough to drive the
/// opponent policy without asking the actor again.
#[derive(Debug, Clone, Copy)]
pub struct GameUpdate {
    pub status: GameStatus,
    pub turn: Turn,
    pub board: Board,
}

/// Milliseconds since the Unix epoch.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
