//! Error types for the session layer.

use crate::{SessionId, SessionStatus};

/// Errors that can occur while driving a session.
///
/// None of these reach a client: the protocol has no error frame, so
/// callers log them and carry on.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A status change that would move the state machine sideways or
    /// backwards, e.g. Completed → InProgress.
    #[error("invalid session transition: {from} -> {to}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    /// A second player tried to join a session that isn't waiting for one.
    #[error("session {id} is not awaiting an opponent (status: {status})")]
    NotJoinable { id: SessionId, status: SessionStatus },
}
