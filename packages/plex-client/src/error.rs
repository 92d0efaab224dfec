//! Plex API error types

use thiserror::Error;

/// Plex API client errors
#[derive(Error, Debug)]
pub enum PlexError {
    /// Token rejected by the server (401/403)
    #[error("Plex rejected the token (status {0})")]
    Unauthorized(u16),

    /// Lookup found no library section or collection with the requested title
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid input provided to an API method
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("failed to parse Plex response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Plex returned a non-success status
    #[error("Plex API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response parsed but lacked a required field
    #[error("unexpected Plex response: {0}")]
    InvalidResponse(String),

    /// Server could not be reached
    #[error("connection refused. Is Plex running at {0}?")]
    ConnectionRefused(String),

    /// Request timeout
    #[error("request to Plex timed out after {0} seconds")]
    Timeout(u64),
}

impl PlexError {
    /// True for the typed "does not exist" case
    pub fn is_not_found(&self) -> bool {
        matches!(self, PlexError::NotFound(_))
    }

    /// True when the server refused our credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, PlexError::Unauthorized(_))
    }
}

/// Result type for Plex operations
pub type PlexResult<T> = Result<T, PlexError>;
