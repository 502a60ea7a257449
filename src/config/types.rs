//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::defaults::{
    default_database_path, default_history_len, default_nickname, default_realname, default_user,
    default_verbosity,
};
use super::locale::LocaleConfig;
use super::logging::LoggingConfig;
use super::validation::ValidationError;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Bot configuration.
///
/// Every section is optional; a missing `[database]` section selects the
/// formatted-text event log instead of the structured one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Identity of the bot on the network.
    #[serde(default)]
    pub client: ClientConfig,
    /// Timestamp rendering for text logs.
    #[serde(default)]
    pub locale: LocaleConfig,
    /// Database configuration.
    pub database: Option<DatabaseConfig>,
    /// Text log destination and per-event templates.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Session state tracking.
    #[serde(default)]
    pub state: StateConfig,
    /// Diagnostic output.
    #[serde(default)]
    pub debug: DebugConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

/// Bot identity.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Nickname the bot registers with; this is the tracked client.
    #[serde(default = "default_nickname")]
    pub nickname: String,
    /// Username (ident).
    #[serde(default = "default_user")]
    pub user: String,
    /// Real name / GECOS.
    #[serde(default = "default_realname")]
    pub realname: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            nickname: default_nickname(),
            user: default_user(),
            realname: default_realname(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the redb file. `:memory:` opens a throwaway in-memory database.
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Session state tracking configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StateConfig {
    /// Capacity of each channel's recent-message buffer.
    #[serde(default = "default_history_len")]
    pub history_len: usize,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            history_len: default_history_len(),
        }
    }
}

/// Diagnostic output configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DebugConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset
    /// ("error", "warn", "info", "debug", "trace").
    #[serde(default = "default_verbosity")]
    pub verbosity: String,
    /// Append diagnostics to this file instead of stderr.
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            verbosity: default_verbosity(),
            file: None,
        }
    }
}
