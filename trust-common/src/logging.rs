//! Tracing subscriber initialisation for embedding programs and tests

use crate::config::LoggingConfig;
use crate::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber filtered by `config.level`
///
/// Safe to call more than once: if a global subscriber is already set the
/// call is a no-op.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| Error::Config(format!("Invalid log level {:?}: {}", config.level, e)))?;

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global tracing subscriber already installed");
    }

    Ok(())
}
