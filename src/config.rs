//! Configuration for building a function registry
//!
//! ```toml
//! [registry]
//! # Zone for today_date / yesterday_date (default: the process-local zone)
//! local_timezone = "Europe/Berlin"
//! # Freeze the clock (RFC 3339); default is the system clock
//! now = "2024-03-15T12:00:00Z"
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::template::FunctionRegistry;
use crate::time::{FixedClock, Location};

/// Errors that can occur when loading or applying a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Unknown time zone in config: {name}")]
    InvalidTimezone { name: String },
    #[error("Invalid timestamp {value:?}: {source}")]
    InvalidNow {
        value: String,
        source: chrono::ParseError,
    },
}

/// Registry settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Zone used by the functions without a timezone argument
    pub local_timezone: Option<String>,
    /// Fixed "now" as an RFC 3339 timestamp
    pub now: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load config from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Override the local zone
    pub fn with_local_timezone(mut self, name: impl Into<String>) -> Self {
        self.registry.local_timezone = Some(name.into());
        self
    }

    /// Override the clock with a fixed RFC 3339 instant
    pub fn with_now(mut self, now: impl Into<String>) -> Self {
        self.registry.now = Some(now.into());
        self
    }

    /// Build the registry these settings describe
    ///
    /// Unlike template arguments, a bad zone name here is an error: it comes
    /// from the operator, not from message text.
    pub fn build_registry(&self) -> Result<FunctionRegistry, ConfigError> {
        let mut registry = FunctionRegistry::new();

        if let Some(name) = &self.registry.local_timezone {
            let zone = Location::from_name(name)
                .map_err(|_| ConfigError::InvalidTimezone { name: name.clone() })?;
            registry = registry.with_local_zone(zone);
        }

        if let Some(value) = &self.registry.now {
            let clock = FixedClock::from_rfc3339(value).map_err(|source| ConfigError::InvalidNow {
                value: value.clone(),
                source,
            })?;
            registry = registry.with_clock(clock);
        }

        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::from_str("").expect("Should parse");
        assert_eq!(config, Config::default());
        let registry = config.build_registry().expect("Should build");
        assert_eq!(registry.local_zone(), Location::Local);
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_str(
            r#"
[registry]
local_timezone = "Asia/Tokyo"
now = "2024-03-15T20:00:00Z"
"#,
        )
        .expect("Should parse");
        let registry = config.build_registry().expect("Should build");
        assert_eq!(registry.today_date().unwrap(), "2024-03-16");
        assert_eq!(registry.today("15:04", "UTC").unwrap(), "20:00");
    }

    #[test]
    fn test_overrides() {
        let registry = Config::default()
            .with_local_timezone("UTC")
            .with_now("2024-01-01T00:30:00Z")
            .build_registry()
            .expect("Should build");
        assert_eq!(registry.yesterday_date().unwrap(), "2023-12-31");
    }

    #[test]
    fn test_invalid_timezone_error() {
        let result = Config::default()
            .with_local_timezone("Atlantis/Capital")
            .build_registry();
        assert!(matches!(result, Err(ConfigError::InvalidTimezone { .. })));
    }

    #[test]
    fn test_invalid_now_error() {
        let result = Config::default().with_now("noon").build_registry();
        assert!(matches!(result, Err(ConfigError::InvalidNow { .. })));
    }

    #[test]
    fn test_unknown_key_error() {
        let result = Config::from_str("[registry]\nzone = \"UTC\"\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_invalid_toml_error() {
        let invalid = "this is not valid toml {{{{";
        assert!(Config::from_str(invalid).is_err());
    }
}
