//! # dropfour
//!
//! Real-time Connect Four server for two-party play over WebSockets.
//!
//! This crate wires the workspace together: `axum` serves the HTTP API
//! and upgrades `GET /ws`, each socket gets a handler task speaking the
//! JSON protocol from `dropfour-protocol`, matchmaking runs through
//! `dropfour-match`, and all gameplay state lives behind the per-game
//! actors in `dropfour-game`.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use dropfour::ServerBuilder;
//! use dropfour_game::{MemoryStore, TraceEventSink};
//!
//! # async fn run() -> Result<(), dropfour::ServerError> {
//! let server = ServerBuilder::new()
//!     .bind("0.0.0.0:3001")
//!     .build(Arc::new(MemoryStore::new()), Arc::new(TraceEventSink))
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::ServerError;
pub use server::{Server, ServerBuilder, ServerConfig};
