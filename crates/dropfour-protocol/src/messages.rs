//! The client/server message unions.
//!
//! The JSON contract is fixed by the browser client: internally tagged
//! objects with camelCase tags and fields. Both enums carry
//! `#[serde(tag = "type", rename_all = "camelCase",
//! rename_all_fields = "camelCase")]`, so for example
//! `ClientMessage::MakeMove { game_id, column }` is exactly
//! `{ "type": "makeMove", "gameId": "...", "column": 3 }` on the wire.
//!
//! Inbound payloads are closed: a frame whose `type` tag is unknown, or
//! whose fields are missing or mistyped, fails to decode and is answered
//! with an [`ServerMessage::Error`] before any dispatch happens.

use serde::{Deserialize, Serialize};

use crate::ids::GameId;
use crate::snapshot::GameSnapshot;

/// Everything a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Enter matchmaking under a display name.
    Join { username: String },

    /// Resume a live game after a dropped connection. Accepted only
    /// while a reconnect window is open for the named player.
    Rejoin { username: String, game_id: GameId },

    /// Drop a piece into `column` (0-based, left to right).
    MakeMove { game_id: GameId, column: usize },
}

/// Everything the server may send.
///
/// State is pushed whole: after every accepted move, join, reconnect,
/// or forfeit, both players receive a fresh [`GameSnapshot`] rather than
/// a delta. `error` never terminates the connection; the client may
/// simply try again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Matchmaking acknowledgement while no opponent is available.
    Waiting { message: String },

    /// Full authoritative state of the requester's game.
    GameState { game: GameSnapshot },

    /// The opponent's connection dropped; a reconnect window is open.
    PlayerDisconnected { message: String },

    /// The opponent came back inside their reconnect window.
    PlayerReconnected { username: String },

    /// A request was rejected. The message is display-ready.
    Error { message: String },
}
