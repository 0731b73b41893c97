//! Server builder, shared state, and the HTTP surface.
//!
//! One listener serves everything: `GET /ws` upgrades into the
//! per-connection handler, the rest is a small JSON API for the
//! frontend. The builder binds the listener up front so callers (and
//! tests) can read `local_addr` before `run`.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use dropfour_game::{EventSink, GameRegistry, GameStore, LeaderboardEntry, Link, Participant};
use dropfour_match::MatchQueue;
use dropfour_protocol::{JsonCodec, ParticipantId};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, mpsc};

use crate::ServerError;
use crate::handler::ws_upgrade;

/// Display name of the automated opponent.
pub(crate) const BOT_USERNAME: &str = "Bot";

/// Rows returned by the leaderboard endpoint.
const LEADERBOARD_LIMIT: usize = 100;

/// Timing knobs for a running server.
///
/// Board geometry is fixed by `dropfour-board`; only the waits are
/// tunable, and tests shrink them hard.
#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    /// How long a lone player waits before being paired with the bot.
    pub fallback_after: Duration,
    /// How long a disconnected player may return before forfeiting.
    pub reconnect_window: Duration,
    /// Pause before each automated move, so the bot feels deliberate.
    pub bot_move_delay: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            fallback_after: Duration::from_secs(10),
            reconnect_window: Duration::from_secs(30),
            bot_move_delay: Duration::from_millis(500),
        }
    }
}

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The queue
/// mutex is taken only for the queue's short synchronous calls, never
/// across an await into the game layer.
pub(crate) struct AppState<S: GameStore, E: EventSink> {
    pub(crate) queue: Mutex<MatchQueue>,
    pub(crate) registry: GameRegistry<S, E>,
    pub(crate) store: Arc<S>,
    pub(crate) config: ServerConfig,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a dropfour server.
///
/// # Example
///
/// ```rust,ignore
/// let server = ServerBuilder::new()
///     .bind("0.0.0.0:3001")
///     .build(store, events)
///     .await?;
/// server.run().await
/// ```
pub struct ServerBuilder {
    bind_addr: String,
    config: ServerConfig,
}

impl ServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "0.0.0.0:3001".to_string(),
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the timing configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and assembles the server around the given
    /// settlement collaborators.
    pub async fn build<S, E>(
        self,
        store: Arc<S>,
        events: Arc<E>,
    ) -> Result<Server<S, E>, ServerError>
    where
        S: GameStore,
        E: EventSink,
    {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        let (queue, fallback_rx) = MatchQueue::new(self.config.fallback_after);

        let state = Arc::new(AppState {
            queue: Mutex::new(queue),
            registry: GameRegistry::new(
                self.config.reconnect_window,
                Arc::clone(&store),
                events,
            ),
            store,
            config: self.config,
            codec: JsonCodec,
        });

        Ok(Server {
            listener,
            state,
            fallback_rx,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound dropfour server. Call [`run()`](Self::run) to start serving.
pub struct Server<S: GameStore, E: EventSink> {
    listener: TcpListener,
    state: Arc<AppState<S, E>>,
    fallback_rx: mpsc::UnboundedReceiver<ParticipantId>,
}

impl<S, E> Server<S, E>
where
    S: GameStore,
    E: EventSink,
{
    /// Creates a new builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves connections until the process is terminated.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!(addr = %self.listener.local_addr()?, "dropfour server running");

        tokio::spawn(fallback_loop(Arc::clone(&self.state), self.fallback_rx));

        let app = router(self.state);
        axum::serve(self.listener, app).await?;
        Ok(())
    }
}

fn router<S: GameStore, E: EventSink>(state: Arc<AppState<S, E>>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/api/leaderboard", get(leaderboard::<S, E>))
        .route("/ws", get(ws_upgrade::<S, E>))
        .with_state(state)
}

async fn root() -> &'static str {
    "Connect Four API Server"
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn leaderboard<S: GameStore, E: EventSink>(
    State(state): State<Arc<AppState<S, E>>>,
) -> Result<Json<Vec<LeaderboardEntry>>, (StatusCode, String)> {
    match state.store.leaderboard(LEADERBOARD_LIMIT).await {
        Ok(rows) => Ok(Json(rows)),
        Err(err) => {
            tracing::error!(error = %err, "leaderboard query failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch leaderboard".to_string(),
            ))
        }
    }
}

/// Pairs players whose wait ran out with the automated opponent.
///
/// Fires on this channel are proposals, not decisions: the id is
/// claimed through `take_if_waiting`, which refuses players who
/// matched or withdrew in the meantime, and a ticket whose writer is
/// already gone is dropped rather than seated in a game it can never
/// see.
async fn fallback_loop<S: GameStore, E: EventSink>(
    state: Arc<AppState<S, E>>,
    mut fires: mpsc::UnboundedReceiver<ParticipantId>,
) {
    while let Some(id) = fires.recv().await {
        let ticket = state.queue.lock().await.take_if_waiting(id);
        let Some(ticket) = ticket else { continue };
        if ticket.tx.is_closed() {
            tracing::debug!(participant = %ticket.id, "fallback fired for a closed connection");
            continue;
        }

        tracing::info!(
            participant = %ticket.id,
            username = %ticket.username,
            "wait expired, pairing with the bot"
        );

        let human = Participant::human(
            ticket.id,
            ticket.username,
            Link {
                conn: ticket.conn,
                tx: ticket.tx,
            },
        );
        // The bot takes seat two, so the human opens.
        let bot = Participant::automated(BOT_USERNAME);
        state.registry.create_game(human, bot).await;
    }
}
