//! Per-connection WebSocket handler.
//!
//! Each upgraded socket gets one task running [`handle_socket`] plus a
//! writer task owning the sink half. Everything the server wants to
//! tell this player goes through one unbounded channel: game actors
//! and this task both push `ServerMessage`s, the writer serializes
//! them to the wire in order.
//!
//! The flow per frame is:
//!   1. decode a `ClientMessage`
//!   2. dispatch: join → queue, rejoin / makeMove → registry
//!   3. rejections go back as `error{message}`; the socket stays open
//!
//! When the read loop ends the connection is withdrawn from the queue
//! and reported to the registry, which opens a reconnect window if the
//! player was mid-game.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use dropfour_bot::choose_column;
use dropfour_game::{EventSink, GameStatus, GameStore, GameUpdate, Link, OutboundTx, Participant};
use dropfour_match::{Enqueued, Ticket};
use dropfour_protocol::{
    ClientMessage, Codec, ConnectionId, GameId, JsonCodec, ParticipantId, ServerMessage,
};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::server::AppState;

/// Inbound `type` tags the server understands. Anything else is
/// answered with "Unknown message type".
const KNOWN_KINDS: [&str; 3] = ["join", "rejoin", "makeMove"];

pub(crate) async fn ws_upgrade<S: GameStore, E: EventSink>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState<S, E>>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handles a single connection from upgrade to close.
async fn handle_socket<S: GameStore, E: EventSink>(
    socket: WebSocket,
    state: Arc<AppState<S, E>>,
) {
    let conn = ConnectionId::next();
    tracing::debug!(%conn, "websocket connected");

    let (sink, mut stream) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_outbound(sink, rx, state.codec));

    read_loop(&state, conn, &tx, &mut stream).await;

    // Kill the writer before cleanup so a racing fallback fire sees
    // this connection as closed instead of seating it in a bot game.
    writer.abort();
    state.queue.lock().await.withdraw(conn);
    state.registry.disconnect(conn).await;

    tracing::debug!(%conn, "websocket closed");
}

async fn read_loop<S: GameStore, E: EventSink>(
    state: &Arc<AppState<S, E>>,
    conn: ConnectionId,
    tx: &OutboundTx,
    stream: &mut SplitStream<WebSocket>,
) {
    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(err) => {
                tracing::debug!(%conn, error = %err, "websocket read failed");
                return;
            }
        };

        match frame {
            Message::Text(text) => handle_frame(state, conn, tx, text.as_bytes()).await,
            Message::Binary(data) => handle_frame(state, conn, tx, &data).await,
            Message::Close(_) => return,
            // axum answers pings itself.
            _ => {}
        }
    }
}

/// Drains the outbound channel into the socket. Exits when the channel
/// closes or the peer stops accepting writes.
async fn write_outbound(
    mut sink: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<ServerMessage>,
    codec: JsonCodec,
) {
    while let Some(msg) = rx.recv().await {
        let text = match codec.encode(&msg) {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(error = %err, "failed to encode outbound message");
                continue;
            }
        };
        if sink.send(Message::Text(text.into())).await.is_err() {
            break;
        }
    }
}

async fn handle_frame<S: GameStore, E: EventSink>(
    state: &Arc<AppState<S, E>>,
    conn: ConnectionId,
    tx: &OutboundTx,
    data: &[u8],
) {
    let msg = match state.codec.decode::<ClientMessage>(data) {
        Ok(msg) => msg,
        Err(err) => {
            tracing::debug!(%conn, error = %err, "undecodable frame");
            send(tx, ServerMessage::Error {
                message: reject_reason(data).to_string(),
            });
            return;
        }
    };

    match msg {
        ClientMessage::Join { username } => handle_join(state, conn, tx, username).await,
        ClientMessage::Rejoin { username, game_id } => {
            handle_rejoin(state, conn, tx, username, game_id).await
        }
        ClientMessage::MakeMove { game_id, column } => {
            handle_make_move(state, conn, tx, game_id, column).await
        }
    }
}

/// Classifies an undecodable frame the way clients expect: only a
/// well-formed object with an unrecognized `type` is "Unknown message
/// type"; bad fields on a known kind and unparseable bytes are both
/// "Invalid message format".
fn reject_reason(data: &[u8]) -> &'static str {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return "Invalid message format";
    };
    match value.get("type").and_then(serde_json::Value::as_str) {
        Some(kind) if !KNOWN_KINDS.contains(&kind) => "Unknown message type",
        _ => "Invalid message format",
    }
}

async fn handle_join<S: GameStore, E: EventSink>(
    state: &Arc<AppState<S, E>>,
    conn: ConnectionId,
    tx: &OutboundTx,
    username: String,
) {
    if username.is_empty() {
        send(tx, ServerMessage::Error {
            message: "Username is required".to_string(),
        });
        return;
    }

    let ticket = Ticket {
        id: ParticipantId::next(),
        username,
        conn,
        tx: tx.clone(),
    };

    // Lock only for the enqueue, drop before the game is created.
    let enqueued = state.queue.lock().await.enqueue(ticket);

    match enqueued {
        Enqueued::Matched { first, second } => {
            let first = Participant::human(
                first.id,
                first.username,
                Link {
                    conn: first.conn,
                    tx: first.tx,
                },
            );
            let second = Participant::human(
                second.id,
                second.username,
                Link {
                    conn: second.conn,
                    tx: second.tx,
                },
            );
            state.registry.create_game(first, second).await;
        }
        Enqueued::Waiting => {
            send(tx, ServerMessage::Waiting {
                message: "Waiting for opponent...".to_string(),
            });
        }
    }
}

async fn handle_rejoin<S: GameStore, E: EventSink>(
    state: &Arc<AppState<S, E>>,
    conn: ConnectionId,
    tx: &OutboundTx,
    username: String,
    game_id: GameId,
) {
    let link = Link {
        conn,
        tx: tx.clone(),
    };
    if let Err(err) = state.registry.reconnect(&game_id, &username, link).await {
        send(tx, ServerMessage::Error {
            message: err.to_string(),
        });
    }
}

async fn handle_make_move<S: GameStore, E: EventSink>(
    state: &Arc<AppState<S, E>>,
    conn: ConnectionId,
    tx: &OutboundTx,
    game_id: GameId,
    column: usize,
) {
    match state.registry.apply_move(&game_id, conn, column).await {
        Ok(update) => drive_bot(state, &game_id, &update),
        Err(err) => send(tx, ServerMessage::Error {
            message: err.to_string(),
        }),
    }
}

/// Schedules the automated side's reply if the update hands it the
/// turn.
///
/// The board cannot change while the automated side holds the turn, so
/// the column is chosen up front and the delay only paces the reply.
/// A rejected move means the game ended in the meantime; it is
/// dropped.
fn drive_bot<S: GameStore, E: EventSink>(
    state: &Arc<AppState<S, E>>,
    id: &GameId,
    update: &GameUpdate,
) {
    if update.status != GameStatus::Active || !update.turn.is_automated() {
        return;
    }

    let state = Arc::clone(state);
    let id = id.clone();
    let mut update = *update;
    tokio::spawn(async move {
        while update.status == GameStatus::Active && update.turn.is_automated() {
            let Some(column) = choose_column(&update.board, update.turn.seat()) else {
                return;
            };
            tokio::time::sleep(state.config.bot_move_delay).await;
            match state.registry.apply_automated_move(&id, column).await {
                Ok(next) => update = next,
                Err(err) => {
                    tracing::debug!(game_id = %id, error = %err, "automated move dropped");
                    return;
                }
            }
        }
    });
}

/// Pushes to this connection's writer. A dead writer means the socket
/// is gone; the disconnect path will notice, so the send result is
/// dropped.
fn send(tx: &OutboundTx, msg: ServerMessage) {
    let _ = tx.send(msg);
}
