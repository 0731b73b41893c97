//! Codec trait and implementations for message framing.
//!
//! A codec converts between Rust types and frame bodies, so the rest of
//! the server never names a serialization format: it talks to whatever
//! implements [`Codec`].
//!
//! Encoding produces a `String` because this protocol travels in
//! WebSocket *text* frames (the browser client calls `JSON.parse` on
//! `event.data`). Decoding takes `&[u8]` so both text and binary frames
//! feed it without copying.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes outbound messages and decodes inbound ones.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a text frame body.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes a frame body back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON via `serde_json`.
///
/// Behind the `json` feature flag (enabled by default), which keeps the
/// door open for a compact binary codec without touching any other code.
///
/// ## Example
///
/// ```rust
/// use dropfour_protocol::{ClientMessage, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let text = r#"{"type":"join","username":"alice"}"#;
/// let msg: ClientMessage = codec.decode(text.as_bytes()).unwrap();
/// assert_eq!(msg, ClientMessage::Join { username: "alice".into() });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientMessage, GameId, ServerMessage};

    #[test]
    fn test_encode_decode_client_message() {
        let codec = JsonCodec;
        let msg = ClientMessage::MakeMove {
            game_id: GameId::new("abc"),
            column: 4,
        };
        let text = codec.encode(&msg).unwrap();
        let decoded: ClientMessage = codec.decode(text.as_bytes()).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_encode_produces_json_text() {
        let codec = JsonCodec;
        let msg = ServerMessage::Error {
            message: "Game not found".into(),
        };
        let text = codec.encode(&msg).unwrap();
        assert!(text.starts_with('{'));
        assert!(text.contains("\"type\":\"error\""));
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let codec = JsonCodec;
        let result: Result<ClientMessage, _> = codec.decode(b"\x00\xff");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
