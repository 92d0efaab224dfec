//! Worker configuration loaded from environment variables
//!
//! Built once at startup and passed by reference into every pipeline stage.

use std::time::Duration;

use curator_shared_config::{
    get_required_env, parse_env, parse_list_env, parse_required_env, CommonConfig, ConfigError,
    ConfigResult, OllamaConfig, PlexConfig,
};

use crate::error::WorkerResult;

/// Default pause between collection runs (one day)
pub const DEFAULT_WAIT_SECONDS: u64 = 86_400;

/// Worker configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Service connection settings shared with other binaries
    pub common: CommonConfig,

    /// Plex libraries to curate, in processing order
    pub library_names: Vec<String>,

    /// Title of the collection maintained in every library
    pub collection_title: String,

    /// Most recent history entries sent to the model
    pub history_amount: usize,

    /// Number of recommendations asked for
    pub recommended_amount: usize,

    /// A collection is only written when more than this many titles resolve
    pub minimum_amount: usize,

    /// Seconds to sleep between runs
    pub wait_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> WorkerResult<Self> {
        let common = CommonConfig::from_env()?;

        let config = Self {
            common,
            library_names: parse_list_env("LIBRARY_NAMES")?,
            collection_title: get_required_env("COLLECTION_TITLE")?.trim().to_string(),
            history_amount: parse_required_env("HISTORY_AMOUNT")?,
            recommended_amount: parse_required_env("RECOMMENDED_AMOUNT")?,
            minimum_amount: parse_required_env("MINIMUM_AMOUNT")?,
            wait_seconds: parse_env("SECONDS_TO_WAIT", DEFAULT_WAIT_SECONDS)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints the parsers cannot express
    pub fn validate(&self) -> ConfigResult<()> {
        if self.library_names.is_empty() {
            return Err(ConfigError::ValidationError(
                "LIBRARY_NAMES must list at least one library".to_string(),
            ));
        }
        if self.collection_title.is_empty() {
            return Err(ConfigError::EmptyValue("COLLECTION_TITLE".to_string()));
        }
        if self.history_amount == 0 {
            return Err(ConfigError::ValidationError(
                "HISTORY_AMOUNT must be greater than zero".to_string(),
            ));
        }
        if self.recommended_amount == 0 {
            return Err(ConfigError::ValidationError(
                "RECOMMENDED_AMOUNT must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Pause between runs
    pub fn wait_duration(&self) -> Duration {
        Duration::from_secs(self.wait_seconds)
    }

    /// Get Plex configuration
    pub fn plex(&self) -> &PlexConfig {
        &self.common.plex
    }

    /// Get model endpoint configuration
    pub fn ollama(&self) -> &OllamaConfig {
        &self.common.ollama
    }
}
