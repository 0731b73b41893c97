//! The full-state view pushed to clients.
//!
//! The server never sends deltas. Every transition re-sends the whole
//! snapshot, so a client that missed a frame (or just reconnected) is
//! consistent again after the next push:
//!
//! ```text
//! {
//!   "id": "3f2a…",
//!   "board": [[null,null,…], …],        ← 6 rows × 7 cols, row 0 = top
//!   "currentPlayer": "alice",
//!   "player1": { "username": "alice", "isBot": false },
//!   "player2": { "username": "Bot",   "isBot": true },
//!   "status": "active",
//!   "winner": null                      ← username, "draw", or null
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::ids::GameId;

/// Lifecycle phase of a game. Monotonic: `Active` → `Finished`, never
/// back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Moves are being accepted.
    Active,
    /// Terminal. Settled exactly once; no further transitions.
    Finished,
}

/// One seat as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub username: String,
    pub is_bot: bool,
}

/// Authoritative state of one game, as sent inside
/// [`ServerMessage::GameState`](crate::ServerMessage::GameState).
///
/// Cells carry the *username* of their owner (or `null`), not a seat
/// index: the client renders names directly and never learns about
/// seats. `winner` is `null` while active, the winning username once
/// decided, or the literal `"draw"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub id: GameId,
    /// Row-major grid, row 0 at the top, pieces stack from row 5 up.
    pub board: Vec<Vec<Option<String>>>,
    /// Username of the side to move (last meaningful while active).
    pub current_player: String,
    pub player1: PlayerView,
    pub player2: PlayerView,
    pub status: GameStatus,
    pub winner: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_snapshot() -> GameSnapshot {
        GameSnapshot {
            id: GameId::new("deadbeef"),
            board: vec![vec![None; 7]; 6],
            current_player: "carol".into(),
            player1: PlayerView {
                username: "carol".into(),
                is_bot: false,
            },
            player2: PlayerView {
                username: "Bot".into(),
                is_bot: true,
            },
            status: GameStatus::Active,
            winner: None,
        }
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&GameStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::to_string(&GameStatus::Finished).unwrap(),
            "\"finished\""
        );
    }

    #[test]
    fn test_player_view_uses_is_bot_camel_case() {
        let view = PlayerView {
            username: "Bot".into(),
            is_bot: true,
        };
        let json: serde_json::Value = serde_json::to_value(&view).unwrap();
        assert_eq!(json["username"], "Bot");
        assert_eq!(json["isBot"], true);
        // The snake_case spelling must not leak onto the wire.
        assert!(json.get("is_bot").is_none());
    }

    #[test]
    fn test_snapshot_field_names_are_camel_case() {
        let json: serde_json::Value =
            serde_json::to_value(active_snapshot()).unwrap();
        assert_eq!(json["currentPlayer"], "carol");
        assert_eq!(json["status"], "active");
        assert!(json["winner"].is_null());
        assert_eq!(json["board"].as_array().unwrap().len(), 6);
        assert_eq!(json["board"][0].as_array().unwrap().len(), 7);
    }

    #[test]
    fn test_snapshot_winner_draw_is_literal_string() {
        let mut snap = active_snapshot();
        snap.status = GameStatus::Finished;
        snap.winner = Some("draw".into());
        let json: serde_json::Value = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["status"], "finished");
        assert_eq!(json["winner"], "draw");
    }

    #[test]
    fn test_snapshot_board_cells_hold_usernames() {
        let mut snap = active_snapshot();
        snap.board[5][3] = Some("carol".into());
        let json: serde_json::Value = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["board"][5][3], "carol");
        assert!(json["board"][0][3].is_null());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let snap = active_snapshot();
        let text = serde_json::to_string(&snap).unwrap();
        let decoded: GameSnapshot = serde_json::from_str(&text).unwrap();
        assert_eq!(snap, decoded);
    }
}
