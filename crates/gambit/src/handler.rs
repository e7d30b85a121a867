//! Per-connection handler.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. It does two things at once:
//!   1. forwards every inbound frame to the lobby
//!   2. encodes and writes every message queued for this player
//!
//! The handler never decides anything about the game.

use gambit_protocol::Codec;
use gambit_session::PlayerHandle;
use gambit_transport::{Connection, ConnectionId, WebSocketConnection};

use crate::GambitError;
use crate::lobby::{LobbyEvent, LobbySender};

/// Drop guard that reports the connection closed when the handler exits.
///
/// Runs on every exit path, including errors, so the lobby always
/// learns about the disconnect exactly once.
struct CloseGuard {
    conn_id: ConnectionId,
    lobby: LobbySender,
}

impl Drop for CloseGuard {
    fn drop(&mut self) {
        let _ = self.lobby.send(LobbyEvent::Closed(self.conn_id));
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    lobby: LobbySender,
    codec: C,
) -> Result<(), GambitError> {
    let conn_id = conn.id();
    let (player, mut outbox) = PlayerHandle::channel(conn_id);

    lobby
        .send(LobbyEvent::Connected(player))
        .map_err(|_| GambitError::LobbyClosed)?;
    let _guard = CloseGuard {
        conn_id,
        lobby: lobby.clone(),
    };
    tracing::debug!(%conn_id, "connection registered");

    loop {
        tokio::select! {
            inbound = conn.recv() => match inbound {
                Ok(Some(data)) => {
                    let event = LobbyEvent::Frame { conn_id, data };
                    if lobby.send(event).is_err() {
                        let _ = conn.close().await;
                        return Err(GambitError::LobbyClosed);
                    }
                }
                Ok(None) => {
                    tracing::info!(%conn_id, "connection closed");
                    break;
                }
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "recv error");
                    break;
                }
            },
            Some(msg) = outbox.recv() => {
                let bytes = codec.encode(&msg)?;
                conn.send(&bytes).await?;
                tracing::trace!(
                    %conn_id,
                    command = msg.command(),
                    "message sent"
                );
            }
        }
    }

    Ok(())
}
