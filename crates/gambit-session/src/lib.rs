//! Match-making and game sessions for Gambit.
//!
//! A [`Session`] is one two-player game: it seats the players, enforces
//! whose turn it is, relays moves and chat, and ends the game. The
//! [`MatchMaker`] owns every live session and pairs incoming connections,
//! keeping at most one session waiting for an opponent.
//!
//! # Key types
//!
//! - [`MatchMaker`]: the registry: pending session, routing, teardown
//! - [`Session`]: the per-game state machine
//! - [`SessionStatus`]: AwaitingOpponent → InProgress → Completed
//! - [`Seat`] / [`PlayerHandle`]: who sits where, and how to reach them
//!
//! Nothing here is async or locked. The server drives a `MatchMaker`
//! from a single task, so every event is handled to completion before
//! the next one starts.

mod error;
mod id;
mod matchmaker;
mod player;
mod session;
mod status;

pub use error::SessionError;
pub use id::SessionId;
pub use matchmaker::{IdGenerator, MatchMaker};
pub use player::{PlayerHandle, Seat};
pub use session::{DestroyHook, Session};
pub use status::SessionStatus;
