//! TOML Configuration File Support
//!
//! Client configuration lives at `~/.config/databot/client.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [connection]
//! url = "ws://localhost:8000/ws"
//! connect_timeout_ms = 5000
//! max_message_size = 1048576
//!
//! [conversation]
//! max_input_chars = 4000
//! event_queue_capacity = 64
//! closed_notice = "Connection closed."
//! errored_notice = "Connection lost."
//! ```
//!
//! # Environment Variables
//!
//! - `DATABOT_URL`: assistant endpoint
//! - `DATABOT_CONNECT_TIMEOUT_MS`: handshake timeout
//! - `DATABOT_MAX_INPUT_CHARS`: longest accepted submission

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::conversation::EngineConfig;
use crate::transport::TransportConfig;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where the highest-priority configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[connection]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionToml {
    /// Assistant endpoint
    pub url: Option<String>,

    /// Handshake timeout in milliseconds
    pub connect_timeout_ms: Option<u64>,

    /// Largest accepted inbound message in bytes
    pub max_message_size: Option<usize>,
}

/// `[conversation]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationToml {
    /// Longest accepted submission in characters
    pub max_input_chars: Option<usize>,

    /// Capacity of the inbound event queue
    pub event_queue_capacity: Option<usize>,

    /// Notice shown when the connection closes
    pub closed_notice: Option<String>,

    /// Notice shown when the connection fails
    pub errored_notice: Option<String>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientToml {
    /// Connection section
    pub connection: ConnectionToml,

    /// Conversation section
    pub conversation: ConversationToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Transport settings
    pub transport: TransportConfig,

    /// Engine settings
    pub engine: EngineConfig,

    /// Capacity of the inbound event queue
    pub event_queue_capacity: usize,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    source: ConfigSource,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            engine: EngineConfig::default(),
            event_queue_capacity: 64,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ClientConfig {
    /// Configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Where the highest-priority value came from
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Check values that would make the client unusable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for a non-WebSocket url or a
    /// zero limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.transport.url).map_err(|e| {
            ConfigError::ValidationError(format!("url '{}': {e}", self.transport.url))
        })?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(ConfigError::ValidationError(format!(
                "url '{}' must use ws:// or wss://",
                self.transport.url
            )));
        }
        if self.transport.connect_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "connect_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.transport.max_message_size == 0 {
            return Err(ConfigError::ValidationError(
                "max_message_size must be greater than 0".to_string(),
            ));
        }
        if self.engine.max_input_chars == 0 {
            return Err(ConfigError::ValidationError(
                "max_input_chars must be greater than 0".to_string(),
            ));
        }
        if self.event_queue_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "event_queue_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/databot/client.toml` or
/// `~/.config/databot/client.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("databot").join("client.toml"))
}

/// Load configuration from the default path, then the environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed,
/// or if the result fails validation. A missing config file is not an error.
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path, then the environment
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if the result
/// fails validation.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ClientConfig, ConfigError> {
    load_with_env(path.as_deref(), |key| std::env::var(key).ok())
}

/// Load with an explicit environment lookup
///
/// `env` returns the value of a variable, or `None` if it is unset.
///
/// # Errors
///
/// See [`load_config_from_path`].
pub fn load_with_env<F>(path: Option<&Path>, env: F) -> Result<ClientConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ClientConfig::default();

    if let Some(config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.to_path_buf(),
                    source: e,
                })?;

            let toml_config: ClientToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.to_path_buf());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ClientConfig, toml: &ClientToml) {
    if let Some(ref url) = toml.connection.url {
        config.transport.url.clone_from(url);
    }
    if let Some(timeout) = toml.connection.connect_timeout_ms {
        config.transport.connect_timeout_ms = timeout;
    }
    if let Some(size) = toml.connection.max_message_size {
        config.transport.max_message_size = size;
    }

    if let Some(max) = toml.conversation.max_input_chars {
        config.engine.max_input_chars = max;
    }
    if let Some(capacity) = toml.conversation.event_queue_capacity {
        config.event_queue_capacity = capacity;
    }
    if let Some(ref notice) = toml.conversation.closed_notice {
        config.engine.closed_notice.clone_from(notice);
    }
    if let Some(ref notice) = toml.conversation.errored_notice {
        config.engine.errored_notice.clone_from(notice);
    }
}

/// Apply environment variable overrides
fn apply_env_config<F>(config: &mut ClientConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env("DATABOT_URL") {
        config.transport.url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(timeout) = env("DATABOT_CONNECT_TIMEOUT_MS") {
        match timeout.parse::<u64>() {
            Ok(ms) => {
                config.transport.connect_timeout_ms = ms;
                config.source = ConfigSource::Env;
            }
            Err(_) => tracing::warn!(value = %timeout, "Ignoring invalid DATABOT_CONNECT_TIMEOUT_MS"),
        }
    }
    if let Some(max) = env("DATABOT_MAX_INPUT_CHARS") {
        match max.parse::<usize>() {
            Ok(n) => {
                config.engine.max_input_chars = n;
                config.source = ConfigSource::Env;
            }
            Err(_) => tracing::warn!(value = %max, "Ignoring invalid DATABOT_MAX_INPUT_CHARS"),
        }
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Command-line overrides, applied after [`load_config`]
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Endpoint override
    pub url: Option<String>,

    /// Connect timeout override (milliseconds)
    pub connect_timeout_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set endpoint override
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set connect timeout override
    #[must_use]
    pub fn with_connect_timeout_ms(mut self, ms: u64) -> Self {
        self.connect_timeout_ms = Some(ms);
        self
    }

    /// Apply overrides to a configuration and re-validate it
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if an override is invalid.
    pub fn apply(&self, config: &mut ClientConfig) -> Result<(), ConfigError> {
        if self.url.is_some() || self.connect_timeout_ms.is_some() {
            config.source = ConfigSource::Cli;
        }
        if let Some(ref url) = self.url {
            config.transport.url.clone_from(url);
        }
        if let Some(timeout) = self.connect_timeout_ms {
            config.transport.connect_timeout_ms = timeout;
        }
        config.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
