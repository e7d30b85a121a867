//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The bytes are not a well-formed envelope (bad JSON, missing
    /// `command`, wrong types).
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The envelope is well-formed but its `data` doesn't have the shape
    /// the command requires, e.g. a `move` without `to`.
    #[error("invalid data for command `{command}`: {source}")]
    InvalidData {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}
