//! Seats and the handles used to reach the players sitting in them.

use std::fmt;

use gambit_protocol::ServerMessage;
use gambit_transport::ConnectionId;
use tokio::sync::mpsc;

/// One of the two places at a board.
///
/// White is the player who created the session and always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seat {
    White,
    Black,
}

impl Seat {
    pub const BOTH: [Seat; 2] = [Seat::White, Seat::Black];

    /// 0 for White, 1 for Black.
    pub fn index(self) -> usize {
        match self {
            Self::White => 0,
            Self::Black => 1,
        }
    }

    /// The seat whose turn it is after `turn_index` accepted moves.
    pub fn to_move(turn_index: u32) -> Self {
        if turn_index % 2 == 0 {
            Self::White
        } else {
            Self::Black
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => write!(f, "white"),
            Self::Black => write!(f, "black"),
        }
    }
}

/// A seated player: the connection's id plus its outbound queue.
///
/// Sending is fire-and-forget. The connection task on the other end of
/// the channel encodes and writes each message; if that task is gone
/// the message is dropped.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    id: ConnectionId,
    outbox: mpsc::UnboundedSender<ServerMessage>,
}

impl PlayerHandle {
    pub fn new(
        id: ConnectionId,
        outbox: mpsc::UnboundedSender<ServerMessage>,
    ) -> Self {
        Self { id, outbox }
    }

    /// Creates a handle together with the receiving end of its outbox.
    pub fn channel(
        id: ConnectionId,
    ) -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(id, tx), rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queues `msg` for delivery.
    pub fn send(&self, msg: ServerMessage) {
        let command = msg.command();
        if self.outbox.send(msg).is_err() {
            tracing::debug!(
                conn_id = %self.id,
                command,
                "outbox closed, message dropped"
            );
        }
    }
}
