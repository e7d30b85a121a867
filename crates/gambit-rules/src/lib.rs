//! Rules-engine adapter for Gambit.
//!
//! Sessions never know chess. They hand `(from, to)` square names to a
//! [`RulesEngine`] and ask it whether the game has ended. [`ChessRules`]
//! is the standard-chess implementation, backed by `shakmaty`.
//!
//! # Key types
//!
//! - [`RulesEngine`]: the contract a session relies on
//! - [`ChessRules`]: standard chess with automatic queen promotion
//! - [`AppliedMove`]: what an accepted move did (capture, promotion)
//! - [`TerminalCondition`]: why a game ended

mod chess;
mod engine;
mod error;

pub use chess::ChessRules;
pub use engine::{AppliedMove, PieceKind, RulesEngine, TerminalCondition};
pub use error::RulesError;
