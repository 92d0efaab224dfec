//! Plex media server configuration types

use crate::{get_required_env, parse_env, parse_optional_env, validate_url, ConfigResult};

/// Plex server connection configuration
#[derive(Clone)]
pub struct PlexConfig {
    /// Plex server URL (e.g., http://192.168.1.10:32400)
    pub url: String,

    /// X-Plex-Token used for every request
    pub token: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Account whose watch history is sampled; `None` picks the server owner
    pub account_id: Option<u64>,
}

impl std::fmt::Debug for PlexConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlexConfig")
            .field("url", &self.url)
            .field("token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("account_id", &self.account_id)
            .finish()
    }
}

impl PlexConfig {
    /// Load Plex configuration from environment variables
    ///
    /// `PLEX_URL` and `PLEX_TOKEN` are required.
    pub fn from_env() -> ConfigResult<Self> {
        let url = get_required_env("PLEX_URL")?;
        validate_url("PLEX_URL", &url)?;
        let token = get_required_env("PLEX_TOKEN")?;

        Ok(Self {
            url: url.trim().to_string(),
            token: token.trim().to_string(),
            timeout_secs: parse_env("PLEX_TIMEOUT", 30)?,
            account_id: parse_optional_env("PLEX_ACCOUNT_ID")?,
        })
    }

    /// Create a configuration with custom URL and token (useful for testing)
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            timeout_secs: 30,
            account_id: None,
        }
    }

    /// Join a server path onto the base URL
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }
}
