//! Error types for the rules layer.

/// Errors that can occur while setting up a rules engine.
///
/// Playing moves never errors: an illegal move is a normal outcome and
/// is reported as `None` by
/// [`RulesEngine::apply_move`](crate::RulesEngine::apply_move).
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// The FEN string couldn't be parsed.
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    /// The FEN parsed but describes an impossible position.
    #[error("invalid position: {0}")]
    InvalidPosition(String),
}
