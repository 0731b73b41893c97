//! End-to-end tests over real sockets: WebSocket play against a server
//! bound to an OS-assigned port, plus the HTTP API.

use std::sync::Arc;
use std::time::Duration;

use dropfour::{ServerBuilder, ServerConfig};
use dropfour_game::{MemoryStore, NullEventSink};
use dropfour_protocol::{ClientMessage, GameId, GameSnapshot, GameStatus, ServerMessage};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

type Ws = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Short waits so fallback and bot pacing don't slow the suite down.
fn test_config() -> ServerConfig {
    ServerConfig {
        fallback_after: Duration::from_millis(500),
        reconnect_window: Duration::from_secs(30),
        bot_move_delay: Duration::from_millis(10),
    }
}

async fn start() -> (String, MemoryStore) {
    let store = MemoryStore::new();
    let server = ServerBuilder::new()
        .bind("127.0.0.1:0")
        .config(test_config())
        .build(Arc::new(store.clone()), Arc::new(NullEventSink))
        .await
        .unwrap();
    let addr = server.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    (addr, store)
}

async fn ws(addr: &str) -> Ws {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .unwrap();
    ws
}

fn enc(msg: &ClientMessage) -> Message {
    Message::Text(serde_json::to_string(msg).unwrap().into())
}

async fn recv(ws: &mut Ws) -> ServerMessage {
    let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timeout")
        .unwrap()
        .unwrap();
    serde_json::from_slice(&msg.into_data()).unwrap()
}

async fn join(ws: &mut Ws, username: &str) {
    ws.send(enc(&ClientMessage::Join {
        username: username.into(),
    }))
    .await
    .unwrap();
}

async fn make_move(ws: &mut Ws, game_id: &GameId, column: usize) {
    ws.send(enc(&ClientMessage::MakeMove {
        game_id: game_id.clone(),
        column,
    }))
    .await
    .unwrap();
}

async fn game_state(ws: &mut Ws) -> GameSnapshot {
    match recv(ws).await {
        ServerMessage::GameState { game } => game,
        other => panic!("expected gameState, got {other:?}"),
    }
}

async fn assert_error(ws: &mut Ws, expected: &str) {
    match recv(ws).await {
        ServerMessage::Error { message } => assert_eq!(message, expected),
        other => panic!("expected error, got {other:?}"),
    }
}

// ---------------------------------------------------------------
// Two players: match, play a full game, settle, read it back over
// the leaderboard endpoint.
// ---------------------------------------------------------------
#[tokio::test]
async fn test_match_play_and_settle() {
    let (addr, store) = start().await;

    let mut alice = ws(&addr).await;
    join(&mut alice, "alice").await;
    assert!(matches!(
        recv(&mut alice).await,
        ServerMessage::Waiting { .. }
    ));

    let mut bob = ws(&addr).await;
    join(&mut bob, "bob").await;

    // Both get the opening snapshot; the player who waited opens.
    let snap_a = game_state(&mut alice).await;
    let snap_b = game_state(&mut bob).await;
    assert_eq!(snap_a.id, snap_b.id);
    assert_eq!(snap_a.current_player, "alice");
    assert_eq!(snap_a.player1.username, "alice");
    assert_eq!(snap_a.player2.username, "bob");
    let id = snap_a.id.clone();

    // Alice stacks column 0; bob trails in column 1.
    for _ in 0..3 {
        make_move(&mut alice, &id, 0).await;
        let _ = game_state(&mut alice).await;
        let _ = game_state(&mut bob).await;
        make_move(&mut bob, &id, 1).await;
        let _ = game_state(&mut alice).await;
        let _ = game_state(&mut bob).await;
    }
    make_move(&mut alice, &id, 0).await;

    let fin_a = game_state(&mut alice).await;
    let fin_b = game_state(&mut bob).await;
    assert_eq!(fin_a.status, GameStatus::Finished);
    assert_eq!(fin_a.winner.as_deref(), Some("alice"));
    assert_eq!(fin_b.winner.as_deref(), Some("alice"));

    // Settlement runs off the game task; give it a beat.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let games = store.saved_games().await;
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].winner, "alice");
    assert_eq!(games[0].moves.len(), 7);

    let rows: Vec<serde_json::Value> =
        reqwest::get(format!("http://{addr}/api/leaderboard"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["username"], "alice");
    assert_eq!(rows[0]["wins"], 1);
    assert_eq!(rows[1]["username"], "bob");
    assert_eq!(rows[1]["losses"], 1);
}

// ---------------------------------------------------------------
// A lone player is paired with the bot after the fallback wait,
// keeps the opening move, and gets a paced reply.
// ---------------------------------------------------------------
#[tokio::test]
async fn test_lone_player_gets_bot_game() {
    let (addr, _store) = start().await;

    let mut carol = ws(&addr).await;
    join(&mut carol, "carol").await;
    assert!(matches!(
        recv(&mut carol).await,
        ServerMessage::Waiting { .. }
    ));

    let snap = game_state(&mut carol).await;
    assert!(snap.player2.is_bot);
    assert_eq!(snap.player2.username, "Bot");
    assert_eq!(snap.current_player, "carol");
    let id = snap.id.clone();

    make_move(&mut carol, &id, 3).await;
    let after_human = game_state(&mut carol).await;
    assert_eq!(after_human.board[5][3].as_deref(), Some("carol"));
    assert_eq!(after_human.current_player, "Bot");

    let after_bot = game_state(&mut carol).await;
    assert_eq!(after_bot.current_player, "carol");
    let bot_cells = after_bot
        .board
        .iter()
        .flatten()
        .filter(|cell| cell.as_deref() == Some("Bot"))
        .count();
    assert_eq!(bot_cells, 1);
}

// ---------------------------------------------------------------
// Rejection paths: every bad request is answered on the same
// socket and none of them kill it.
// ---------------------------------------------------------------
#[tokio::test]
async fn test_rejections_keep_the_connection_open() {
    let (addr, _store) = start().await;
    let mut client = ws(&addr).await;

    join(&mut client, "").await;
    assert_error(&mut client, "Username is required").await;

    make_move(&mut client, &GameId::new("missing"), 0).await;
    assert_error(&mut client, "Game not found").await;

    client
        .send(Message::Text(r#"{"type":"dance"}"#.into()))
        .await
        .unwrap();
    assert_error(&mut client, "Unknown message type").await;

    client.send(Message::Text("]".into())).await.unwrap();
    assert_error(&mut client, "Invalid message format").await;

    // Still usable.
    join(&mut client, "alice").await;
    assert!(matches!(
        recv(&mut client).await,
        ServerMessage::Waiting { .. }
    ));
}

// ---------------------------------------------------------------
// Drop a socket mid-game, rejoin on a fresh one, keep playing.
// ---------------------------------------------------------------
#[tokio::test]
async fn test_rejoin_on_a_fresh_socket() {
    let (addr, _store) = start().await;

    let mut alice = ws(&addr).await;
    join(&mut alice, "alice").await;
    let _ = recv(&mut alice).await; // waiting
    let mut bob = ws(&addr).await;
    join(&mut bob, "bob").await;
    let snap = game_state(&mut alice).await;
    let _ = game_state(&mut bob).await;
    let id = snap.id.clone();

    drop(alice);
    match recv(&mut bob).await {
        ServerMessage::PlayerDisconnected { message } => {
            assert_eq!(message, "alice disconnected. Reconnecting...");
        }
        other => panic!("expected playerDisconnected, got {other:?}"),
    }

    let mut alice2 = ws(&addr).await;
    alice2
        .send(enc(&ClientMessage::Rejoin {
            username: "alice".into(),
            game_id: id.clone(),
        }))
        .await
        .unwrap();

    let snap = game_state(&mut alice2).await;
    assert_eq!(snap.status, GameStatus::Active);

    // Bob sees the refreshed state, then the reconnect notice.
    let _ = game_state(&mut bob).await;
    assert!(matches!(
        recv(&mut bob).await,
        ServerMessage::PlayerReconnected { username } if username == "alice"
    ));

    // The rebound connection moves.
    make_move(&mut alice2, &id, 0).await;
    let snap = game_state(&mut alice2).await;
    assert_eq!(snap.board[5][0].as_deref(), Some("alice"));
    let _ = game_state(&mut bob).await;
}

// ---------------------------------------------------------------
// HTTP surface: banner, health, empty leaderboard.
// ---------------------------------------------------------------
#[tokio::test]
async fn test_http_surface() {
    let (addr, _store) = start().await;

    let root = reqwest::get(format!("http://{addr}/"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(root, "Connect Four API Server");

    let health: serde_json::Value = reqwest::get(format!("http://{addr}/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    let rows: Vec<serde_json::Value> =
        reqwest::get(format!("http://{addr}/api/leaderboard"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    assert!(rows.is_empty());
}
