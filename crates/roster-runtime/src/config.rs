#![forbid(unsafe_code)]

//! Configuration as data.
//!
//! [`RosterConfig`] collects every tunable of the runtime in one struct that
//! can be loaded from TOML or JSON at startup.
//!
//! ```toml
//! # roster.toml
//! [coordinator]
//! max_undo_entries = 50
//! warn_on_pending = false
//!
//! [log]
//! filter = "roster=debug"
//! ```
//!
//! ```rust,ignore
//! let config = RosterConfig::from_toml_file("roster.toml")?;
//! let coordinator = Coordinator::new(config.coordinator.clone());
//! ```
//!
//! Every field has a default, so a partial file (or an empty one) is valid.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::undo::CoordinatorConfig;

// ---------------------------------------------------------------------------
// Top-level RosterConfig
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct RosterConfig {
    /// Undo depth and commit diagnostics.
    pub coordinator: CoordinatorConfig,

    /// Log output settings.
    pub log: LogConfig,
}

impl RosterConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters.
    ///
    /// Returns a list of problems. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.coordinator.max_undo_entries == 0 {
            errors.push("coordinator.max_undo_entries must be at least 1".into());
        }
        if self.log.filter.trim().is_empty() {
            errors.push("log.filter must not be empty".into());
        }

        errors
    }

    /// [`validate`](Self::validate), as a `Result`.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Log section
// ---------------------------------------------------------------------------

/// Log output settings, read by the subscriber installer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct LogConfig {
    /// `EnvFilter` directive used when the environment sets none.
    pub filter: String,
    /// Colorize output.
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
            ansi: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_validates_clean() {
        let errors = RosterConfig::default().validate();
        assert!(errors.is_empty(), "default should validate: {errors:?}");
    }

    #[test]
    fn defaults_match_component_defaults() {
        let config = RosterConfig::default();
        assert_eq!(config.coordinator, CoordinatorConfig::default());
        assert_eq!(config.coordinator.max_undo_entries, usize::MAX);
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn validate_catches_zero_depth() {
        let mut config = RosterConfig::default();
        config.coordinator.max_undo_entries = 0;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("max_undo_entries")));
    }

    #[test]
    fn validate_catches_blank_filter() {
        let mut config = RosterConfig::default();
        config.log.filter = "  ".into();
        let err = config.validated().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref list) if list.len() == 1));
        assert!(err.to_string().contains("log.filter"));
    }

    #[cfg(feature = "config")]
    #[test]
    fn partial_toml_keeps_defaults() {
        let config = RosterConfig::from_toml_str("[coordinator]\nmax_undo_entries = 7\n").unwrap();
        assert_eq!(config.coordinator.max_undo_entries, 7);
        assert!(config.coordinator.warn_on_pending);
        assert_eq!(config.log, LogConfig::default());
    }

    #[cfg(feature = "config")]
    #[test]
    fn bad_json_reports_parse_error() {
        let err = RosterConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
