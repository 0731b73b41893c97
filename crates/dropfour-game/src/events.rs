//! Analytics events and the sink they flow into.
//!
//! Settlement and move tracking publish fire-and-forget events; a real
//! deployment forwards them to a message bus, the default binary logs
//! them. Publishing must never block or fail a game transition, so the
//! sink is synchronous and infallible from the caller's side.

use dropfour_protocol::GameId;
use serde::Serialize;

/// The analytics stream, one event per notable transition.
///
/// Tagged `game_start` / `move` / `game_end` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    GameStart {
        game_id: GameId,
        player1: String,
        player2: String,
        against_bot: bool,
        at_ms: u64,
    },
    /// Attributed to the participant who actually made the move.
    #[serde(rename = "move")]
    MovePlayed {
        game_id: GameId,
        player: String,
        column: usize,
        row: usize,
        /// 1-based position in the game's move log.
        move_number: usize,
        at_ms: u64,
    },
    GameEnd {
        game_id: GameId,
        /// Winning username, or `"draw"`.
        winner: String,
        duration_secs: u64,
        total_moves: usize,
        at_ms: u64,
    },
}

/// Consumes the analytics stream.
pub trait EventSink: Send + Sync + 'static {
    fn publish(&self, event: GameEvent);
}

/// Logs every event as one JSON line through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceEventSink;

impl EventSink for TraceEventSink {
    fn publish(&self, event: GameEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => tracing::info!(target: "dropfour::events", %json, "game event"),
            Err(err) => tracing::warn!(%err, "failed to serialize game event"),
        }
    }
}

/// Swallows everything. For tests and embedders that don't care.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn publish(&self, _event: GameEvent) {}
}
