//! The lobby: a single task that owns the match-maker.
//!
//! Connection handlers never touch sessions directly. They forward
//! every frame and close to the lobby over one channel, and the lobby
//! handles them strictly in arrival order. That ordering is what makes
//! turn checks, relays and teardown race-free without locks.

use std::collections::HashMap;

use gambit_protocol::{Codec, Envelope};
use gambit_rules::RulesEngine;
use gambit_session::{MatchMaker, PlayerHandle};
use gambit_transport::ConnectionId;
use tokio::sync::mpsc;

/// Channel sender connection handlers use to reach the lobby.
pub(crate) type LobbySender = mpsc::UnboundedSender<LobbyEvent>;

/// Something that happened on a connection.
#[derive(Debug)]
pub(crate) enum LobbyEvent {
    /// A connection was accepted. Carries the handle used to reach it.
    Connected(PlayerHandle),
    /// A raw inbound frame.
    Frame {
        conn_id: ConnectionId,
        data: Vec<u8>,
    },
    /// The connection is gone, cleanly or not.
    Closed(ConnectionId),
}

pub(crate) struct Lobby<R: RulesEngine, C: Codec> {
    matchmaker: MatchMaker<R>,
    /// Every open connection, seated or not.
    players: HashMap<ConnectionId, PlayerHandle>,
    codec: C,
}

impl<R: RulesEngine, C: Codec> Lobby<R, C> {
    pub(crate) fn new(matchmaker: MatchMaker<R>, codec: C) -> Self {
        Self {
            matchmaker,
            players: HashMap::new(),
            codec,
        }
    }

    /// Handles events until every sender is dropped.
    pub(crate) async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<LobbyEvent>,
    ) {
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        tracing::info!("lobby stopped");
    }

    fn handle(&mut self, event: LobbyEvent) {
        match event {
            LobbyEvent::Connected(player) => {
                tracing::debug!(
                    conn_id = %player.id(),
                    "connection joined lobby"
                );
                self.players.insert(player.id(), player);
            }
            LobbyEvent::Frame { conn_id, data } => {
                self.handle_frame(conn_id, &data)
            }
            LobbyEvent::Closed(conn_id) => {
                self.players.remove(&conn_id);
                self.matchmaker.handle_close(conn_id);
            }
        }
    }

    fn handle_frame(&mut self, conn_id: ConnectionId, data: &[u8]) {
        let Some(player) = self.players.get(&conn_id) else {
            tracing::trace!(%conn_id, "frame from unknown connection");
            return;
        };
        let envelope: Envelope = match self.codec.decode(data) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!(
                    %conn_id,
                    error = %e,
                    "undecodable frame dropped"
                );
                return;
            }
        };
        self.matchmaker.handle_envelope(player, envelope);
    }
}
