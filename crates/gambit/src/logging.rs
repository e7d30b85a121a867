//! Tracing subscriber setup for binaries.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::GambitError;

/// Installs a global `fmt` subscriber.
///
/// The filter comes from `RUST_LOG` when it is set and valid, and from
/// `default_filter` otherwise.
///
/// # Errors
/// Returns [`GambitError::Config`] if `default_filter` is needed but
/// doesn't parse, or if a global subscriber is already installed.
pub fn init(default_filter: &str) -> Result<(), GambitError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| {
                GambitError::Config(format!(
                    "log filter {default_filter:?}: {e}"
                ))
            })?,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| {
            GambitError::Config(format!("logging already initialized: {e}"))
        })
}
