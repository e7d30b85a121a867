//! The session lifecycle.

use std::fmt;

use crate::SessionError;

/// The lifecycle status of a session.
///
/// ```text
/// AwaitingOpponent → InProgress → Completed
///         └──────────────────────────↑
/// ```
///
/// - **AwaitingOpponent**: one player seated, waiting for a second.
///   Moves and chat are ignored.
/// - **InProgress**: both seats filled, moves are accepted.
/// - **Completed**: the game ended or was abandoned. Terminal.
///
/// A session abandoned before anyone joined goes straight to
/// Completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionStatus {
    #[default]
    AwaitingOpponent,
    InProgress,
    Completed,
}

impl SessionStatus {
    /// Returns `true` if a second player may still join.
    pub fn is_joinable(self) -> bool {
        matches!(self, Self::AwaitingOpponent)
    }

    /// Returns `true` while moves are accepted.
    pub fn is_active(self) -> bool {
        matches!(self, Self::InProgress)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns `true` if moving to `target` is valid.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::AwaitingOpponent, Self::InProgress)
                | (Self::AwaitingOpponent, Self::Completed)
                | (Self::InProgress, Self::Completed)
        )
    }

    /// Moves to `target`.
    ///
    /// # Errors
    /// Returns [`SessionError::InvalidTransition`] if the move goes
    /// backwards or stays put.
    pub fn transition(self, target: Self) -> Result<Self, SessionError> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(SessionError::InvalidTransition {
                from: self,
                to: target,
            })
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingOpponent => write!(f, "AwaitingOpponent"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}
