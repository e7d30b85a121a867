//! `GambitServer` builder and server loop.
//!
//! This is the entry point for running a Gambit server. It ties the
//! layers together: transport → protocol → lobby → sessions.

use std::marker::PhantomData;
use std::sync::Arc;

use gambit_protocol::{Codec, JsonCodec};
use gambit_rules::RulesEngine;
use gambit_session::MatchMaker;
use gambit_stats::{MemoryStats, StatsRecorder};
use gambit_transport::{Transport, WebSocketTransport};
use tokio::sync::mpsc;

use crate::handler::handle_connection;
use crate::lobby::Lobby;
use crate::{GambitError, ServerConfig};

/// Builder for configuring and starting a Gambit server.
///
/// # Example
///
/// ```rust,ignore
/// use gambit::prelude::*;
///
/// let server = GambitServerBuilder::new()
///     .bind("0.0.0.0:1337")
///     .build::<ChessRules>()
///     .await?;
/// server.run().await
/// ```
pub struct GambitServerBuilder {
    config: ServerConfig,
    stats: Option<Arc<dyn StatsRecorder>>,
}

impl GambitServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            stats: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets where game statistics are recorded. Defaults to a fresh
    /// [`MemoryStats`].
    pub fn stats(mut self, stats: Arc<dyn StatsRecorder>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Binds the listener.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`. Nothing is accepted
    /// until [`GambitServer::run`] is called.
    pub async fn build<R: RulesEngine>(
        self,
    ) -> Result<GambitServer<R, JsonCodec>, GambitError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;
        let stats = self
            .stats
            .unwrap_or_else(|| {
                Arc::new(MemoryStats::new()) as Arc<dyn StatsRecorder>
            });

        Ok(GambitServer {
            transport,
            stats,
            codec: JsonCodec,
            _rules: PhantomData,
        })
    }
}

impl Default for GambitServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Gambit server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct GambitServer<R: RulesEngine, C: Codec> {
    transport: WebSocketTransport,
    stats: Arc<dyn StatsRecorder>,
    codec: C,
    _rules: PhantomData<fn() -> R>,
}

impl<R, C> GambitServer<R, C>
where
    R: RulesEngine,
    C: Codec + Clone,
{
    /// Creates a new builder.
    pub fn builder() -> GambitServerBuilder {
        GambitServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The recorder games report to.
    pub fn stats(&self) -> Arc<dyn StatsRecorder> {
        Arc::clone(&self.stats)
    }

    /// Runs the server accept loop.
    ///
    /// Starts the lobby task, then accepts connections and spawns a
    /// handler task for each. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), GambitError> {
        let (lobby_tx, lobby_rx) = mpsc::unbounded_channel();
        let matchmaker = MatchMaker::<R>::new(Arc::clone(&self.stats));
        let lobby = Lobby::new(matchmaker, self.codec.clone());
        tokio::spawn(lobby.run(lobby_rx));

        match self.local_addr() {
            Ok(addr) => tracing::info!(%addr, "Gambit server listening"),
            Err(_) => tracing::info!("Gambit server running"),
        }

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let lobby = lobby_tx.clone();
                    let codec = self.codec.clone();
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(conn, lobby, codec).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
