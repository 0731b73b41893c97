//! Game sessions: one actor per game, a registry that routes to them,
//! and the settlement seams (store + events) behind traits.
//!
//! # Architecture
//!
//! ```text
//!  connection layer            dropfour-game
//!  ────────────────     ──────────────────────────
//!   join/move/rejoin ──→ GameRegistry ──→ GameHandle ──→ GameActor (task)
//!                          │  HashMap<GameId, handle>        │ owns Game,
//!                          │  ConnectionId → GameId          │ windows,
//!                          │  (brief mutex)                  │ forfeit timers
//!                          │                                 │
//!                          └──── eviction on settle ←────────┘
//!                                                            │
//!                                          GameStore + EventSink (spawned)
//! ```
//!
//! Every command a game receives (a move, a lost connection, a timer
//! expiry) goes through that game's channel and is processed one at a
//! time. Two moves can never interleave, and the terminal transition
//! commits exactly once, without any per-game or global lock being held
//! across an await.
//!
//! Timers never decide anything. A forfeit timer firing only delivers a
//! `WindowExpired` command; the actor re-checks that the same window is
//! still armed and the game still active before forfeiting. Cancellation
//! is attempted on reconnect but never trusted.

mod actor;
mod error;
mod events;
mod game;
mod registry;
mod store;
mod types;

pub use actor::GameHandle;
pub use error::GameError;
pub use events::{EventSink, GameEvent, NullEventSink, TraceEventSink};
pub use game::Game;
pub use registry::GameRegistry;
pub use store::{GameRecord, GameStore, LeaderboardEntry, MemoryStore, PlayerOutcome, StoreError};
pub use types::{
    GameUpdate, Link, MoveRecord, Outcome, OutboundTx, Participant, ParticipantKind, Turn,
};

pub use dropfour_board::{Board, Seat};
pub use dropfour_protocol::GameStatus;
