//! Connection plumbing for Gambit.
//!
//! A game server only needs two things from the network: a source of new
//! players ([`Transport`]) and, per player, a pipe that carries one
//! protocol message per frame ([`Connection`]). Frames are opaque bytes
//! here; the protocol crate decides they hold UTF-8 JSON envelopes.
//!
//! With the `websocket` feature (on by default) this crate ships
//! [`WebSocketTransport`], which speaks plain `ws://` through
//! `tokio-tungstenite`. Outbound frames go out as text messages, since
//! browser clients read them with `JSON.parse`.

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;

/// Names one player connection.
///
/// Ids are never reused within a process, so a stale id left in a
/// routing table can't point at somebody else's socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw counter value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A listener that hands out one [`Connection`] per arriving player.
pub trait Transport: Send + Sync + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next player to finish connecting.
    ///
    /// A failed handshake is an error for that peer only; callers keep
    /// accepting.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;
}

/// A framed, bidirectional pipe to one player.
///
/// All methods take `&self`: the server awaits `recv` and `send` from
/// the same task at once, so an implementation must not let a pending
/// read hold up a write.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    /// Writes one message frame.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Reads the next message frame, skipping control frames.
    ///
    /// `Ok(None)` means the player closed the connection cleanly.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Starts a close handshake with the player.
    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_connection_id_shows_as_conn_n() {
        let id = ConnectionId::new(7);
        assert_eq!(id.get(), 7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_connection_id_keys_a_routing_table() {
        let mut routes = HashMap::new();
        routes.insert(ConnectionId::new(1), "white");
        routes.insert(ConnectionId::new(2), "black");
        assert_eq!(routes[&ConnectionId::new(2)], "black");
        assert!(!routes.contains_key(&ConnectionId::new(3)));
    }
}
