//! Wire protocol for dropfour.
//!
//! Everything the browser client and the server exchange over a
//! WebSocket is defined here:
//!
//! - **Ids** ([`GameId`], [`ParticipantId`], [`ConnectionId`]): opaque
//!   identifiers that cross layer boundaries.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]): the tagged
//!   unions that travel on the wire.
//! - **Snapshots** ([`GameSnapshot`], [`PlayerView`], [`GameStatus`]):
//!   the full-state view pushed after every game transition.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): frame bodies to
//!   messages and back.
//! - **Errors** ([`ProtocolError`]): encode and decode failures.
//!
//! # Architecture
//!
//! This layer sits between the socket (raw frames) and the game layer
//! (sessions and participants). Matchmaking and turn order are none of
//! its business; it fixes the JSON contract and nothing else.
//!
//! ```text
//! Socket (frames) → Protocol (messages) → Game (sessions)
//! ```

mod codec;
mod error;
mod ids;
mod messages;
mod snapshot;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use ids::{ConnectionId, GameId, ParticipantId};
pub use messages::{ClientMessage, ServerMessage};
pub use snapshot::{GameSnapshot, GameStatus, PlayerView};
