//! Wire protocol for Gambit.
//!
//! Every frame on the wire is a JSON object `{ "command": ..., "data": ... }`.
//! This crate defines:
//!
//! - **Types** ([`Envelope`], [`ClientCommand`], [`ServerMessage`], ...):
//!   the frames clients and the server exchange.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how frames become bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong decoding them.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope / ClientCommand) → Session
//! ```
//!
//! The protocol layer knows nothing about connections or sessions.

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ChatData, ClientCommand, Envelope, GameOverReason, MoveData, ServerMessage,
        Winner,
};
