//! # Gambit
//!
//! A two-player chess server over WebSocket.
//!
//! Clients send `start-game` and are paired with the next client to do
//! the same. The server validates every move, relays it and chat to the
//! opponent, and announces the result when the game ends by rule or by
//! a player leaving.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gambit::prelude::*;
//!
//! # async fn start() -> Result<(), GambitError> {
//! let config = ServerConfig::from_env()?;
//! let server = GambitServerBuilder::new()
//!     .config(config)
//!     .build::<ChessRules>()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod lobby;
pub mod logging;
mod server;

pub use config::{
    BIND_ADDR_VAR, DEFAULT_BIND_ADDR, DEFAULT_LOG_FILTER, LOG_FILTER_VAR,
    ServerConfig,
};
pub use error::GambitError;
pub use server::{GambitServer, GambitServerBuilder};

/// Everything needed to run a server or talk to one.
pub mod prelude {
    pub use crate::{
        GambitError, GambitServer, GambitServerBuilder, ServerConfig,
    };

    pub use gambit_protocol::{
        ChatData, ClientCommand, Codec, Envelope, GameOverReason, JsonCodec,
        MoveData, ServerMessage, Winner,
    };
    pub use gambit_rules::{ChessRules, RulesEngine, TerminalCondition};
    pub use gambit_session::{
        MatchMaker, PlayerHandle, Seat, Session, SessionId, SessionStatus,
    };
    pub use gambit_stats::{Counter, MemoryStats, StatsRecorder, StatsSnapshot};
}
