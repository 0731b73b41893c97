//! dropfour server binary.
//!
//! In-memory store and trace-backed analytics; the listen port comes
//! from `PORT` (default 3001).

use std::sync::Arc;

use dropfour::ServerBuilder;
use dropfour_game::{MemoryStore, TraceEventSink};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("dropfour=info".parse()?))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    tracing::info!(%port, "server starting");

    let server = ServerBuilder::new()
        .bind(&format!("0.0.0.0:{port}"))
        .build(Arc::new(MemoryStore::new()), Arc::new(TraceEventSink))
        .await?;

    server.run().await?;
    Ok(())
}
