//! TOML-based session and driver configuration.

use std::fs;
use std::path::Path;

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::feed::FeedMode;

/// Largest accepted UTC offset magnitude, in minutes (18 hours).
pub const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

/// Top-level configuration parsed from TOML.
///
/// Every section has defaults, so an empty document is a valid simulated
/// session. Load with [`AppConfig::from_toml_file`] or start from
/// [`AppConfig::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Feed selection, seed and local time zone.
    #[serde(default)]
    pub session: SessionConfig,
    /// Tick pacing for the periodic driver.
    #[serde(default)]
    pub driver: DriverConfig,
}

/// Feed selection, seed and local time zone.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Generate samples locally. Exclusive with the live feed.
    pub use_simulated: bool,
    /// Connection string of the live feed, used when `use_simulated` is false.
    pub live_endpoint: String,
    /// Seed for the session's random source.
    pub seed: u64,
    /// Offset from UTC used to derive the local hour of day.
    pub utc_offset_minutes: i32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            use_simulated: true,
            live_endpoint: String::new(),
            seed: 42,
            utc_offset_minutes: 0,
        }
    }
}

impl SessionConfig {
    /// The feed mode selected by `use_simulated`.
    pub fn feed_mode(&self) -> FeedMode {
        if self.use_simulated {
            FeedMode::Simulated
        } else {
            FeedMode::Live {
                endpoint: self.live_endpoint.clone(),
            }
        }
    }

    /// The configured offset, or UTC if it is out of range.
    pub fn utc_offset(&self) -> FixedOffset {
        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Utc.fix();
        }
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

/// Tick pacing for the periodic driver.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    /// Wall-clock milliseconds between ticks; 0 runs ticks back to back.
    pub tick_interval_ms: u64,
    /// Number of ticks for a bounded run.
    pub steps: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2000,
            steps: 120,
        }
    }
}

/// A configuration validation or loading error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"session.live_endpoint"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl AppConfig {
    /// Loads a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates cross-field constraints, returning every violation found.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.session;

        if !s.use_simulated && s.live_endpoint.trim().is_empty() {
            errors.push(ConfigError {
                field: "session.live_endpoint".into(),
                message: "must be set when session.use_simulated = false".into(),
            });
        }
        if s.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            errors.push(ConfigError {
                field: "session.utc_offset_minutes".into(),
                message: format!(
                    "must be in [-{MAX_UTC_OFFSET_MINUTES}, {MAX_UTC_OFFSET_MINUTES}], got {}",
                    s.utc_offset_minutes
                ),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let cfg = AppConfig::default();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "default should be valid: {errors:?}");
        assert!(cfg.session.feed_mode().is_simulated());
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let cfg = AppConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.session.seed, 42);
        assert_eq!(cfg.driver.tick_interval_ms, 2000);
        assert_eq!(cfg.driver.steps, 120);
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[session]
use_simulated = false
live_endpoint = "wss://example.home/energy"
seed = 7
utc_offset_minutes = 120

[driver]
tick_interval_ms = 0
steps = 30
"#;
        let cfg = AppConfig::from_toml_str(toml).unwrap();
        assert!(cfg.validate().is_empty());
        assert_eq!(
            cfg.session.feed_mode(),
            FeedMode::Live {
                endpoint: "wss://example.home/energy".into()
            }
        );
        assert_eq!(cfg.session.utc_offset().local_minus_utc(), 7200);
        assert_eq!(cfg.driver.steps, 30);
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[session]
seed = 1
battery_capacity = 12
"#;
        let err = AppConfig::from_toml_str(toml).unwrap_err();
        assert_eq!(err.field, "toml");
    }

    #[test]
    fn validation_requires_endpoint_in_live_mode() {
        let mut cfg = AppConfig::default();
        cfg.session.use_simulated = false;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "session.live_endpoint"));
    }

    #[test]
    fn validation_catches_offset_out_of_range() {
        let mut cfg = AppConfig::default();
        cfg.session.utc_offset_minutes = 1500;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "session.utc_offset_minutes"));
        assert_eq!(cfg.session.utc_offset().local_minus_utc(), 0);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AppConfig::from_toml_file(Path::new("/nonexistent/session.toml")).unwrap_err();
        assert!(err.message.contains("/nonexistent/session.toml"));
    }
}
