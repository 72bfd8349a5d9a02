//! Configuration loading and typed config structures for lifebot.
//!
//! The configuration lives in `lifebot-config.yaml` in the working
//! directory. Every field has a default, so the file (and any section of
//! it) is optional.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Smallest accepted stepping interval in milliseconds.
pub const MIN_STEP_INTERVAL_MS: u64 = 100;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LifebotConfig {
    /// Session and stepping-loop settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Gateway listener settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LifebotConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `LIFEBOT_PORT` overrides `gateway.port`
    /// - `LOG_LEVEL` overrides `logging.level`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse_yaml(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string, then apply env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config = Self::parse_yaml(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn parse_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml reads an empty document as null rather than an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Override values with environment variables when set and valid.
    pub fn apply_env_overrides(&mut self) {
        if let Some(port) = std::env::var("LIFEBOT_PORT")
            .ok()
            .and_then(|val| val.parse().ok())
        {
            self.gateway.port = port;
        }
        if let Ok(val) = std::env::var("LOG_LEVEL") {
            self.logging.level = val.to_lowercase();
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Real-time milliseconds between generations while running.
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,

    /// Largest `width * height` a start command may request.
    #[serde(default = "default_max_cells")]
    pub max_cells: u64,
}

impl SessionConfig {
    /// The stepping cadence, never below [`MIN_STEP_INTERVAL_MS`].
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms.max(MIN_STEP_INTERVAL_MS))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            step_interval_ms: default_step_interval_ms(),
            max_cells: default_max_cells(),
        }
    }
}

/// Gateway listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log filter (trace, debug, info, warn, error, or an `EnvFilter`
    /// directive string).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

const fn default_step_interval_ms() -> u64 {
    1000
}

const fn default_max_cells() -> u64 {
    200
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LifebotConfig::default();
        assert_eq!(config.session.step_interval_ms, 1000);
        assert_eq!(config.session.max_cells, 200);
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
session:
  step_interval_ms: 250
  max_cells: 64
gateway:
  host: "127.0.0.1"
  port: 9000
logging:
  level: "debug"
"#;
        let config = LifebotConfig::parse_yaml(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.session.step_interval(), Duration::from_millis(250));
        assert_eq!(config.session.max_cells, 64);
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = LifebotConfig::parse_yaml("session:\n  max_cells: 9\n");
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.session.max_cells, 9);
        // Everything else uses defaults
        assert_eq!(config.session.step_interval_ms, 1000);
        assert_eq!(config.gateway.host, "0.0.0.0");
    }

    #[test]
    fn parse_empty_yaml() {
        assert_eq!(
            LifebotConfig::parse_yaml("").ok(),
            Some(LifebotConfig::default())
        );
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = LifebotConfig::parse_yaml("session: [1, 2");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn step_interval_has_a_floor() {
        let session = SessionConfig {
            step_interval_ms: 5,
            max_cells: 10,
        };
        assert_eq!(
            session.step_interval(),
            Duration::from_millis(MIN_STEP_INTERVAL_MS)
        );
    }
}
