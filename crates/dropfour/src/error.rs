//! Top-level error type for building and running the server.

/// Everything that can stop the server from starting or serving.
///
/// Gameplay rejections never show up here; those travel to the client
/// as `error{message}` frames and the connection carries on. What's
/// left is socket setup and the accept loop.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Binding the listener or serving connections failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
