//! Unified error type for the Gambit server.

use gambit_protocol::ProtocolError;
use gambit_transport::TransportError;

/// Top-level error for the server: wraps the transport and protocol errors
/// that reach it, plus its own failure modes.
///
/// The `#[from]` attribute on each wrapped variant generates a `From`
/// impl, so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GambitError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, bad payload).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A configuration value that can't be used.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The lobby task is gone, so the connection can't be served.
    #[error("lobby is not running")]
    LobbyClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let gambit_err: GambitError = err.into();
        assert!(matches!(gambit_err, GambitError::Transport(_)));
        assert!(gambit_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = serde_json::from_str::<u8>("x").unwrap_err();
        let gambit_err: GambitError = ProtocolError::Decode(err).into();
        assert!(matches!(gambit_err, GambitError::Protocol(_)));
    }

    #[test]
    fn test_config_error_message() {
        let err = GambitError::Config("GAMBIT_BIND_ADDR: bad".into());
        assert_eq!(
            err.to_string(),
            "invalid configuration: GAMBIT_BIND_ADDR: bad"
        );
    }
}
