#![forbid(unsafe_code)]

//! Subscriber installation.
//!
//! The runtime only emits `tracing` events; nothing is printed until an
//! application installs a subscriber. [`init`] installs a `fmt` subscriber
//! filtered by the `ROSTER_LOG` environment variable, falling back to the
//! [`LogConfig`] filter when the variable is unset or blank.
//!
//! ```text
//! ROSTER_LOG=roster_runtime=debug   # per-store commit/step events
//! ROSTER_LOG=roster_runtime=trace   # plus view refreshes and mutations
//! ```

use roster_runtime::LogConfig;
use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Environment variable read for the filter directive.
pub const LOG_ENV: &str = "ROSTER_LOG";

/// Install the global subscriber with default settings.
pub fn init() -> Result<()> {
    init_with(&LogConfig::default())
}

/// Install the global subscriber.
///
/// Fails if the directive does not parse or a global subscriber is already
/// set.
pub fn init_with(config: &LogConfig) -> Result<()> {
    let directive = filter_directive(config, std::env::var(LOG_ENV).ok());
    let filter = EnvFilter::try_new(&directive).map_err(|e| Error::Telemetry(e.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .try_init()
        .map_err(|e| Error::Telemetry(e.to_string()))
}

/// The environment directive when set and non-blank, else the configured one.
fn filter_directive(config: &LogConfig, env: Option<String>) -> String {
    match env {
        Some(value) if !value.trim().is_empty() => value,
        _ => config.filter.clone(),
    }
}
