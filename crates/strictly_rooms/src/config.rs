//! Client configuration.

use crate::session::PlayerNames;
use crate::store::RetryPolicy;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use strictly_ultimate::{Mark, TurnDuration};
use tracing::{debug, info, instrument};

/// Environment variable that overrides [`RoomsConfig::store_url`].
pub const STORE_URL_ENV: &str = "STRICTLY_ROOMS_STORE_URL";

/// Settings for `strictly_rooms play`.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct RoomsConfig {
    /// Seconds per turn before a move is forced (10 to 60).
    #[serde(default = "default_turn_duration_secs")]
    turn_duration_secs: u32,

    /// Milliseconds between loop passes.
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,

    /// Base URL of the document store server. Online play needs it.
    #[serde(default)]
    store_url: Option<String>,

    /// Default name for X.
    #[serde(default = "default_player_x_name")]
    player_x_name: String,

    /// Default name for O.
    #[serde(default = "default_player_o_name")]
    player_o_name: String,

    /// Mark the computer plays.
    #[serde(default = "default_ai_mark")]
    ai_mark: Mark,

    /// Attempts per store call, including the first.
    #[serde(default = "default_retry_max_attempts")]
    retry_max_attempts: u32,

    /// First retry delay in milliseconds.
    #[serde(default = "default_retry_base_delay_ms")]
    retry_base_delay_ms: u64,

    /// Longest retry delay in milliseconds.
    #[serde(default = "default_retry_max_delay_ms")]
    retry_max_delay_ms: u64,
}

fn default_turn_duration_secs() -> u32 {
    TurnDuration::DEFAULT_SECS
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_player_x_name() -> String {
    "Player X".to_string()
}

fn default_player_o_name() -> String {
    "Player O".to_string()
}

fn default_ai_mark() -> Mark {
    Mark::O
}

fn default_retry_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

impl Default for RoomsConfig {
    fn default() -> Self {
        Self {
            turn_duration_secs: default_turn_duration_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            store_url: None,
            player_x_name: default_player_x_name(),
            player_o_name: default_player_o_name(),
            ai_mark: default_ai_mark(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl RoomsConfig {
    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.turn_duration()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml(&content)?;
        info!(?config, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise the defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Replaces the store URL with `url` when one is given.
    pub fn with_store_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            info!(%url, "Store URL overridden from environment");
            self.store_url = Some(url);
        }
        self
    }

    /// Applies [`STORE_URL_ENV`] if it is set.
    pub fn with_env_overrides(self) -> Self {
        self.with_store_url_override(std::env::var(STORE_URL_ENV).ok())
    }

    /// The validated turn duration.
    pub fn turn_duration(&self) -> Result<TurnDuration, ConfigError> {
        TurnDuration::from_secs(self.turn_duration_secs).map_err(|e| ConfigError::new(e.to_string()))
    }

    /// Interval between loop passes.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Retry settings for store calls.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_max_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            max_delay: Duration::from_millis(self.retry_max_delay_ms),
        }
    }

    /// Default names for both sides.
    pub fn player_names(&self) -> PlayerNames {
        PlayerNames::new(self.player_x_name.clone(), self.player_o_name.clone())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
