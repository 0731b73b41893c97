//! Error types for the protocol layer.
//!
//! Each crate in dropfour defines its own error enum. A `ProtocolError`
//! always means the problem is in framing or serialization, not in
//! matchmaking or game rules.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into a frame body).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed. Common causes: malformed JSON, an unknown
    /// `type` tag, missing required fields, wrong field types.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message is invalid at the protocol level. The variant for
    /// codecs other than the built-in JSON one, which must be able to
    /// report failures even with the `json` feature off.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_message_display() {
        let err = ProtocolError::InvalidMessage("empty frame".into());
        assert_eq!(err.to_string(), "invalid message: empty frame");
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_decode_error_wraps_serde() {
        let inner = serde_json::from_str::<serde_json::Value>("]").unwrap_err();
        let err = ProtocolError::Decode(inner);
        assert!(err.to_string().starts_with("decode failed"));
    }
}
