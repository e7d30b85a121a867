//! Server configuration.

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use crate::GambitError;

/// Address the server listens on unless configured otherwise.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:1337";

/// Log filter used when neither `RUST_LOG` nor `GAMBIT_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Environment variable overriding [`ServerConfig::bind_addr`].
pub const BIND_ADDR_VAR: &str = "GAMBIT_BIND_ADDR";

/// Environment variable overriding [`ServerConfig::log_filter`].
pub const LOG_FILTER_VAR: &str = "GAMBIT_LOG";

/// Configuration for a server instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Socket address to listen on, e.g. `0.0.0.0:1337`.
    pub bind_addr: String,

    /// Default `tracing` filter directive. `RUST_LOG` still wins.
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ServerConfig {
    /// Builds a config from the process environment, falling back to the
    /// defaults for unset variables.
    ///
    /// # Errors
    /// Returns [`GambitError::Config`] if a variable is set to a value
    /// that doesn't parse.
    pub fn from_env() -> Result<Self, GambitError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through
    /// `lookup` instead.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, GambitError> {
        let mut config = Self::default();

        if let Some(addr) = lookup(BIND_ADDR_VAR) {
            addr.parse::<SocketAddr>()
                .map_err(|e| {
                    GambitError::Config(format!(
                        "{BIND_ADDR_VAR}={addr:?}: {e}"
                    ))
                })?;
            config.bind_addr = addr;
        }

        if let Some(filter) = lookup(LOG_FILTER_VAR) {
            EnvFilter::try_new(&filter)
                .map_err(|e| {
                    GambitError::Config(format!(
                        "{LOG_FILTER_VAR}={filter:?}: {e}"
                    ))
                })?;
            config.log_filter = filter;
        }

        Ok(config)
    }
}
