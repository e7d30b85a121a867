//! Codec trait and the JSON implementation.
//!
//! A codec converts between Rust values and raw frame bytes. Callers
//! depend on the [`Codec`] trait, so the wire format can change without
//! touching session code.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust values to bytes and decode them back.
///
/// `Send + Sync + 'static` because the codec lives inside long-running
/// tokio tasks and is shared between them.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON via `serde_json`.
///
/// Browser clients speak JSON natively, so this is the only codec the
/// server ships with.
///
/// ```rust
/// use gambit_protocol::{Codec, Envelope, JsonCodec, MoveData, ServerMessage};
///
/// let codec = JsonCodec;
/// let bytes = codec
///     .encode(&ServerMessage::OpponentMove(MoveData::new("e2", "e4")))
///     .unwrap();
///
/// let envelope: Envelope = codec.decode(&bytes).unwrap();
/// assert_eq!(envelope.command, "opponent-move");
/// assert_eq!(envelope.data["to"], "e4");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Envelope, GameOverReason, ServerMessage, Winner};

    #[test]
    fn test_json_codec_encodes_server_message_as_envelope() {
        let bytes = JsonCodec
            .encode(&ServerMessage::GameOver {
                reason: GameOverReason::Checkmate,
                winner: Winner::You,
            })
            .unwrap();
        let envelope: Envelope = JsonCodec.decode(&bytes).unwrap();
        assert_eq!(envelope.command, "game-over");
        assert_eq!(envelope.data["reason"], "checkmate");
        assert_eq!(envelope.data["winner"], "you");
    }

    #[test]
    fn test_json_codec_decode_garbage_is_decode_error() {
        let result: Result<Envelope, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_decode_missing_command_is_decode_error() {
        let result: Result<Envelope, _> = JsonCodec.decode(br#"{"data":{}}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
