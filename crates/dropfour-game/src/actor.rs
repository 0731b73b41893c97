//! The per-game actor: one Tokio task that owns one [`Game`].
//!
//! Commands arrive on an mpsc channel and are processed one at a time,
//! so moves, disconnects, reconnects, and timer expiries can never
//! interleave within a game. When the game reaches a terminal state the
//! actor settles it (store + events, spawned), evicts itself from the
//! registry, and stops.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use dropfour_board::Seat;
use dropfour_protocol::{ConnectionId, GameId, GameSnapshot, ParticipantId, ServerMessage};
use dropfour_timer::{Deadline, Deferred};
use tokio::sync::{mpsc, oneshot};

use crate::error::GameError;
use crate::events::{EventSink, GameEvent};
use crate::game::Game;
use crate::registry::SharedIndex;
use crate::store::{GameStore, PlayerOutcome};
use crate::types::{GameUpdate, Link, Outcome, Turn};

/// Commands sent to a game actor through its channel.
pub(crate) enum GameCommand {
    /// A move from a connected human. Validated against the connection
    /// currently bound to the to-move seat.
    HumanMove {
        conn: ConnectionId,
        column: usize,
        reply: oneshot::Sender<Result<GameUpdate, GameError>>,
    },

    /// A move on behalf of the automated participant.
    AutomatedMove {
        column: usize,
        reply: oneshot::Sender<Result<GameUpdate, GameError>>,
    },

    /// A socket closed. Opens a reconnect window if it was bound here.
    ConnectionLost { conn: ConnectionId },

    /// A returning player binding a fresh connection to their seat.
    Reconnect {
        username: String,
        link: Link,
        reply: oneshot::Sender<Result<GameUpdate, GameError>>,
    },

    /// Self-sent by a forfeiture timer. Carries the deadline it was
    /// armed with so the actor can detect a stale fire.
    WindowExpired {
        participant: ParticipantId,
        deadline: Deadline,
    },

    /// Request the current wire-facing snapshot.
    Snapshot {
        reply: oneshot::Sender<GameSnapshot>,
    },
}

/// Handle to a running game actor. Cheap to clone (an `mpsc::Sender`
/// wrapper). The registry holds one per live game.
#[derive(Clone)]
pub struct GameHandle {
    id: GameId,
    sender: mpsc::Sender<GameCommand>,
}

impl GameHandle {
    pub fn id(&self) -> &GameId {
        &self.id
    }

    pub async fn human_move(
        &self,
        conn: ConnectionId,
        column: usize,
    ) -> Result<GameUpdate, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(GameCommand::HumanMove {
                conn,
                column,
                reply: reply_tx,
            })
            .await
            .map_err(|_| GameError::Unavailable(self.id.clone()))?;
        reply_rx
            .await
            .map_err(|_| GameError::Unavailable(self.id.clone()))?
    }

    pub async fn automated_move(&self, column: usize) -> Result<GameUpdate, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(GameCommand::AutomatedMove {
                column,
                reply: reply_tx,
            })
            .await
            .map_err(|_| GameError::Unavailable(self.id.clone()))?;
        reply_rx
            .await
            .map_err(|_| GameError::Unavailable(self.id.clone()))?
    }

    /// Fire-and-forget: a settled game's channel may already be gone,
    /// which is fine; there is nothing left to route.
    pub async fn connection_lost(&self, conn: ConnectionId) -> Result<(), GameError> {
        self.sender
            .send(GameCommand::ConnectionLost { conn })
            .await
            .map_err(|_| GameError::Unavailable(self.id.clone()))
    }

    pub async fn reconnect(&self, username: String, link: Link) -> Result<GameUpdate, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(GameCommand::Reconnect {
                username,
                link,
                reply: reply_tx,
            })
            .await
            .map_err(|_| GameError::Unavailable(self.id.clone()))?;
        reply_rx
            .await
            .map_err(|_| GameError::Unavailable(self.id.clone()))?
    }

    pub async fn snapshot(&self) -> Result<GameSnapshot, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(GameCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| GameError::Unavailable(self.id.clone()))?;
        reply_rx
            .await
            .map_err(|_| GameError::Unavailable(self.id.clone()))
    }
}

/// The actor state. Runs inside a Tokio task.
struct GameActor<S, E> {
    game: Game,
    reconnect_window: Duration,
    /// Open reconnect windows, one per disconnected participant. Both
    /// seats may hold one at the same time.
    windows: HashMap<ParticipantId, Deadline>,
    forfeit_timers: HashMap<ParticipantId, Deferred>,
    index: SharedIndex,
    store: Arc<S>,
    events: Arc<E>,
    /// Retained so forfeiture timers can send `WindowExpired` back in.
    self_tx: mpsc::Sender<GameCommand>,
    receiver: mpsc::Receiver<GameCommand>,
}

impl<S: GameStore, E: EventSink> GameActor<S, E> {
    async fn run(mut self) {
        tracing::info!(game_id = %self.game.id(), "game actor started");

        // Opening push: both players learn the game exists and whose
        // move it is.
        self.broadcast_snapshot();

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                GameCommand::HumanMove {
                    conn,
                    column,
                    reply,
                } => {
                    let result = self.handle_human_move(conn, column);
                    let _ = reply.send(result);
                }
                GameCommand::AutomatedMove { column, reply } => {
                    let result = self.handle_automated_move(column);
                    let _ = reply.send(result);
                }
                GameCommand::ConnectionLost { conn } => {
                    self.handle_connection_lost(conn);
                }
                GameCommand::Reconnect {
                    username,
                    link,
                    reply,
                } => {
                    let result = self.handle_reconnect(&username, link);
                    let _ = reply.send(result);
                }
                GameCommand::WindowExpired {
                    participant,
                    deadline,
                } => {
                    self.handle_window_expired(participant, deadline);
                }
                GameCommand::Snapshot { reply } => {
                    let _ = reply.send(self.game.snapshot());
                }
            }

            if !self.game.is_active() {
                self.settle().await;
                break;
            }
        }

        tracing::info!(game_id = %self.game.id(), "game actor stopped");
    }

    fn handle_human_move(
        &mut self,
        conn: ConnectionId,
        column: usize,
    ) -> Result<GameUpdate, GameError> {
        if !self.game.is_active() {
            return Err(GameError::NotActive);
        }
        let seat = match self.game.turn() {
            Turn::Human(seat) => seat,
            Turn::Automated(_) => return Err(GameError::NotYourTurn),
        };
        let bound = self
            .game
            .participant(seat)
            .link
            .as_ref()
            .map(|link| link.conn);
        if bound != Some(conn) {
            return Err(GameError::NotYourTurn);
        }

        let update = self.game.apply_move(seat, column)?;
        self.after_move(seat);
        Ok(update)
    }

    fn handle_automated_move(&mut self, column: usize) -> Result<GameUpdate, GameError> {
        if !self.game.is_active() {
            return Err(GameError::NotActive);
        }
        let seat = match self.game.turn() {
            Turn::Automated(seat) => seat,
            Turn::Human(_) => return Err(GameError::NotYourTurn),
        };
        let update = self.game.apply_move(seat, column)?;
        self.after_move(seat);
        Ok(update)
    }

    fn after_move(&mut self, seat: Seat) {
        if let Some(last) = self.game.moves().last().copied() {
            self.events.publish(GameEvent::MovePlayed {
                game_id: self.game.id().clone(),
                player: self.game.participant(seat).username.clone(),
                column: last.column,
                row: last.row,
                move_number: self.game.moves().len(),
                at_ms: last.at_ms,
            });
        }
        self.broadcast_snapshot();
    }

    fn handle_connection_lost(&mut self, conn: ConnectionId) {
        if !self.game.is_active() {
            return;
        }
        let Some(seat) = self.game.seat_of_conn(conn) else {
            // Stale close: the seat was already rebound to a newer
            // socket, or the connection never belonged here.
            return;
        };

        let (pid, username) = {
            let participant = self.game.participant_mut(seat);
            participant.link = None;
            (participant.id, participant.username.clone())
        };

        let deadline = Deadline::after(self.reconnect_window);
        self.windows.insert(pid, deadline);

        let tx = self.self_tx.clone();
        let timer = Deferred::spawn(self.reconnect_window, async move {
            let _ = tx
                .send(GameCommand::WindowExpired {
                    participant: pid,
                    deadline,
                })
                .await;
        });
        if let Some(stale) = self.forfeit_timers.insert(pid, timer) {
            stale.cancel();
        }

        tracing::info!(
            game_id = %self.game.id(),
            participant = %pid,
            window_ms = self.reconnect_window.as_millis() as u64,
            "connection lost, reconnect window opened"
        );

        self.send_to(
            seat.other(),
            ServerMessage::PlayerDisconnected {
                message: format!("{username} disconnected. Reconnecting..."),
            },
        );
    }

    fn handle_reconnect(&mut self, username: &str, link: Link) -> Result<GameUpdate, GameError> {
        let Some(seat) = self.game.seat_of_username(username) else {
            // Wrong name never consumes anyone's window.
            return Err(GameError::UsernameMismatch);
        };
        let pid = self.game.participant(seat).id;
        let Some(deadline) = self.windows.get(&pid).copied() else {
            return Err(GameError::NoReconnectWindow);
        };

        self.windows.remove(&pid);
        if let Some(timer) = self.forfeit_timers.remove(&pid) {
            timer.cancel();
        }

        if deadline.is_elapsed() {
            // The timer fire is in flight or lost; don't wait for it.
            tracing::info!(
                game_id = %self.game.id(),
                participant = %pid,
                "reconnect arrived after window expiry, forfeiting"
            );
            self.forfeit(seat);
            return Err(GameError::NoReconnectWindow);
        }

        self.game.participant_mut(seat).link = Some(link);
        tracing::info!(
            game_id = %self.game.id(),
            participant = %pid,
            "player reconnected"
        );

        self.broadcast_snapshot();
        self.send_to(
            seat.other(),
            ServerMessage::PlayerReconnected {
                username: username.to_owned(),
            },
        );
        Ok(self.game.update())
    }

    fn handle_window_expired(&mut self, participant: ParticipantId, deadline: Deadline) {
        if !self.game.is_active() {
            return;
        }
        // A fire only counts if the window it was armed for is still
        // the one on record. Reconnect-then-redisconnect swaps the
        // deadline, turning the old fire into a no-op.
        if self.windows.get(&participant) != Some(&deadline) {
            return;
        }
        self.windows.remove(&participant);
        self.forfeit_timers.remove(&participant);

        let Some(seat) = self.game.seat_of_participant(participant) else {
            return;
        };
        tracing::info!(
            game_id = %self.game.id(),
            participant = %participant,
            "reconnect window expired, forfeiting"
        );
        self.forfeit(seat);
    }

    fn forfeit(&mut self, loser: Seat) {
        if self.game.forfeit(loser).is_ok() {
            self.broadcast_snapshot();
        }
    }

    fn broadcast_snapshot(&self) {
        let snapshot = self.game.snapshot();
        for seat in [Seat::One, Seat::Two] {
            self.send_to(
                seat,
                ServerMessage::GameState {
                    game: snapshot.clone(),
                },
            );
        }
    }

    /// Sends to a single seat. Silently drops if the seat has no bound
    /// connection (automated, or mid-reconnect).
    fn send_to(&self, seat: Seat, msg: ServerMessage) {
        if let Some(link) = &self.game.participant(seat).link {
            let _ = link.tx.send(msg);
        }
    }

    /// The one-time terminal transition: settlement, eviction, shutdown.
    ///
    /// Runs inside the actor, so a move and a forfeit racing each other
    /// can never both get here.
    async fn settle(&mut self) {
        for timer in self.forfeit_timers.values() {
            timer.cancel();
        }
        self.forfeit_timers.clear();
        self.windows.clear();

        let record = self.game.record();
        let outcome = self.game.outcome();
        let results: Vec<(String, PlayerOutcome)> = [Seat::One, Seat::Two]
            .into_iter()
            .filter(|&seat| !self.game.participant(seat).is_automated())
            .map(|seat| {
                let username = self.game.participant(seat).username.clone();
                let result = match outcome {
                    Some(Outcome::Winner(winner)) if winner == seat => PlayerOutcome::Won,
                    Some(Outcome::Winner(_)) => PlayerOutcome::Lost,
                    _ => PlayerOutcome::Drew,
                };
                (username, result)
            })
            .collect();

        let event = GameEvent::GameEnd {
            game_id: self.game.id().clone(),
            winner: record.winner.clone(),
            duration_secs: record.duration_secs,
            total_moves: record.moves.len(),
            at_ms: record.ended_at_ms,
        };

        // Settlement runs detached: a slow or failing backend must not
        // keep the actor alive or undo the terminal state.
        let store = Arc::clone(&self.store);
        let events = Arc::clone(&self.events);
        let game_id = self.game.id().clone();
        tokio::spawn(async move {
            events.publish(event);
            if let Err(err) = store.save_game(&record).await {
                tracing::error!(%game_id, %err, "failed to save finished game");
            }
            for (username, result) in results {
                if let Err(err) = store.record_result(&username, result).await {
                    tracing::error!(%game_id, %username, %err, "failed to update standings");
                }
            }
        });

        // Stop routing before the channel goes away.
        let mut index = self.index.lock().await;
        index.games.remove(self.game.id());
        index.conns.retain(|_, id| id != self.game.id());
        drop(index);

        tracing::info!(game_id = %self.game.id(), "game settled");
    }
}

/// Spawns a new game actor task and returns a handle to it.
pub(crate) fn spawn_game<S, E>(
    game: Game,
    reconnect_window: Duration,
    index: SharedIndex,
    store: Arc<S>,
    events: Arc<E>,
    channel_size: usize,
) -> GameHandle
where
    S: GameStore,
    E: EventSink,
{
    let (tx, rx) = mpsc::channel(channel_size);
    let handle = GameHandle {
        id: game.id().clone(),
        sender: tx.clone(),
    };

    let actor = GameActor {
        game,
        reconnect_window,
        windows: HashMap::new(),
        forfeit_timers: HashMap::new(),
        index,
        store,
        events,
        self_tx: tx,
        receiver: rx,
    };
    tokio::spawn(actor.run());

    handle
}
