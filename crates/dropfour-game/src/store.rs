//! Persistence seam for finished games and standings.
//!
//! The engine doesn't know what a database is. It hands finished games
//! to a [`GameStore`] and moves on; the default [`MemoryStore`] keeps
//! everything in process, a real deployment implements the trait over
//! whatever it persists to.

use std::collections::HashMap;
use std::sync::Arc;

use dropfour_protocol::{GameId, GameStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::types::MoveRecord;

/// One finished game, as handed to the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRecord {
    pub id: GameId,
    pub player1: String,
    pub player2: String,
    /// Winning username, or `"draw"`.
    pub winner: String,
    pub status: GameStatus,
    pub started_at_ms: u64,
    pub ended_at_ms: u64,
    pub duration_secs: u64,
    pub moves: Vec<MoveRecord>,
}

/// A finished game from one participant's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerOutcome {
    Won,
    Lost,
    Drew,
}

/// One leaderboard row. Serialized field names are the API contract
/// (`total_games`, not `totalGames`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub total_games: u32,
}

/// Errors from a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached or rejected the write.
    #[error("store backend unavailable: {0}")]
    Backend(String),
}

/// Where finished games and standings go.
///
/// # Trait bounds
///
/// - `Send + Sync` so one store instance is shared across all game
///   actors and the HTTP layer.
/// - `'static` because it lives as long as the server.
pub trait GameStore: Send + Sync + 'static {
    /// Persists a finished game.
    fn save_game(
        &self,
        record: &GameRecord,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Accumulates one result into `username`'s standings row. Called
    /// once per human participant per finished game; the automated
    /// opponent never gets a row.
    fn record_result(
        &self,
        username: &str,
        outcome: PlayerOutcome,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Standings ordered by wins, then by games played, both
    /// descending. At most `limit` rows.
    fn leaderboard(
        &self,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<LeaderboardEntry>, StoreError>> + Send;
}

#[derive(Debug, Default)]
struct Standing {
    wins: u32,
    losses: u32,
    draws: u32,
}

#[derive(Debug, Default)]
struct MemoryInner {
    games: Vec<GameRecord>,
    standings: HashMap<String, Standing>,
}

/// In-process [`GameStore`]. Cheap to clone; all clones share state, so
/// tests can keep one handle and inspect what the server wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record saved so far, in insertion order.
    pub async fn saved_games(&self) -> Vec<GameRecord> {
        self.inner.lock().await.games.clone()
    }
}

impl GameStore for MemoryStore {
    async fn save_game(&self, record: &GameRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.games.push(record.clone());
        Ok(())
    }

    async fn record_result(
        &self,
        username: &str,
        outcome: PlayerOutcome,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let standing = inner.standings.entry(username.to_owned()).or_default();
        match outcome {
            PlayerOutcome::Won => standing.wins += 1,
            PlayerOutcome::Lost => standing.losses += 1,
            PlayerOutcome::Drew => standing.draws += 1,
        }
        Ok(())
    }

    async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let inner = self.inner.lock().await;
        let mut entries: Vec<LeaderboardEntry> = inner
            .standings
            .iter()
            .map(|(username, s)| LeaderboardEntry {
                username: username.clone(),
                wins: s.wins,
                losses: s.losses,
                draws: s.draws,
                total_games: s.wins + s.losses + s.draws,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.wins
                .cmp(&a.wins)
                .then(b.total_games.cmp(&a.total_games))
        });
        entries.truncate(limit);
        Ok(entries)
    }
}

// =========================================================================
// Tests
// =========================================================================
