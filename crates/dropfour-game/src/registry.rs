//! Tracks live games and routes connections to their actors.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dropfour_protocol::{ConnectionId, GameId, GameSnapshot};
use rand::Rng;
use tokio::sync::Mutex;

use crate::actor::{GameHandle, spawn_game};
use crate::error::GameError;
use crate::events::{EventSink, GameEvent};
use crate::game::Game;
use crate::store::GameStore;
use crate::types::{GameUpdate, Link, Participant, now_ms};

/// Default command channel size for game actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// The shared maps: live handles plus a connection index so a closed
/// socket finds its game without scanning.
pub(crate) struct Index {
    pub(crate) games: HashMap<GameId, GameHandle>,
    pub(crate) conns: HashMap<ConnectionId, GameId>,
}

pub(crate) type SharedIndex = Arc<Mutex<Index>>;

/// The entry point for game operations from the connection layer.
///
/// The mutex guards only the maps and is taken for plain lookups and
/// inserts; every operation releases it before awaiting an actor reply,
/// so one slow game never stalls another.
pub struct GameRegistry<S, E> {
    index: SharedIndex,
    reconnect_window: Duration,
    store: Arc<S>,
    events: Arc<E>,
}

impl<S: GameStore, E: EventSink> GameRegistry<S, E> {
    pub fn new(reconnect_window: Duration, store: Arc<S>, events: Arc<E>) -> Self {
        Self {
            index: Arc::new(Mutex::new(Index {
                games: HashMap::new(),
                conns: HashMap::new(),
            })),
            reconnect_window,
            store,
            events,
        }
    }

    /// Creates a game and spawns its actor. `first` takes seat one and
    /// the opening move, so matchmaking rewards whoever waited. The
    /// actor pushes the opening `gameState` to both links.
    pub async fn create_game(
        &self,
        first: Participant,
        second: Participant,
    ) -> (GameId, GameUpdate) {
        let id = GameId::new(generate_game_id());
        let against_bot = first.is_automated() || second.is_automated();
        let event = GameEvent::GameStart {
            game_id: id.clone(),
            player1: first.username.clone(),
            player2: second.username.clone(),
            against_bot,
            at_ms: now_ms(),
        };
        let conns: Vec<ConnectionId> = [&first, &second]
            .into_iter()
            .filter_map(|p| p.link.as_ref().map(|l| l.conn))
            .collect();

        let game = Game::new(id.clone(), first, second);
        let update = game.update();
        let handle = spawn_game(
            game,
            self.reconnect_window,
            Arc::clone(&self.index),
            Arc::clone(&self.store),
            Arc::clone(&self.events),
            DEFAULT_CHANNEL_SIZE,
        );

        {
            let mut index = self.index.lock().await;
            index.games.insert(id.clone(), handle);
            for conn in conns {
                index.conns.insert(conn, id.clone());
            }
        }

        self.events.publish(event);
        tracing::info!(game_id = %id, against_bot, "game created");
        (id, update)
    }

    /// A move from a connected human.
    pub async fn apply_move(
        &self,
        id: &GameId,
        conn: ConnectionId,
        column: usize,
    ) -> Result<GameUpdate, GameError> {
        let handle = self.handle_for(id).await?;
        handle.human_move(conn, column).await
    }

    /// A move for the automated side. Callers treat errors as "someone
    /// got there first" and drop them.
    pub async fn apply_automated_move(
        &self,
        id: &GameId,
        column: usize,
    ) -> Result<GameUpdate, GameError> {
        let handle = self.handle_for(id).await?;
        handle.automated_move(column).await
    }

    /// Rebinds a returning player's fresh connection to their seat.
    pub async fn reconnect(
        &self,
        id: &GameId,
        username: &str,
        link: Link,
    ) -> Result<GameUpdate, GameError> {
        let conn = link.conn;
        let handle = self.handle_for(id).await?;
        let update = handle.reconnect(username.to_owned(), link).await?;

        let mut index = self.index.lock().await;
        // The game may have settled between the reply and this insert;
        // don't resurrect index entries for an evicted game.
        if index.games.contains_key(id) {
            index.conns.insert(conn, id.clone());
        }
        Ok(update)
    }

    /// Routes a closed socket to its game, if it was bound to one.
    /// Unknown connections are a no-op.
    pub async fn disconnect(&self, conn: ConnectionId) {
        let handle = {
            let mut index = self.index.lock().await;
            let Some(id) = index.conns.remove(&conn) else {
                return;
            };
            index.games.get(&id).cloned()
        };
        if let Some(handle) = handle {
            let _ = handle.connection_lost(conn).await;
        }
    }

    pub async fn snapshot(&self, id: &GameId) -> Result<GameSnapshot, GameError> {
        let handle = self.handle_for(id).await?;
        handle.snapshot().await
    }

    /// Number of games currently registered.
    pub async fn game_count(&self) -> usize {
        self.index.lock().await.games.len()
    }

    async fn handle_for(&self, id: &GameId) -> Result<GameHandle, GameError> {
        let index = self.index.lock().await;
        index
            .games
            .get(id)
            .cloned()
            .ok_or_else(|| GameError::NotFound(id.clone()))
    }
}

/// Generates a random 32-character hex game id (128 bits of entropy).
fn generate_game_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
