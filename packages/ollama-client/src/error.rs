//! Error types for the chat-completion client

use thiserror::Error;

/// Errors that can occur when talking to the model server
#[derive(Error, Debug)]
pub enum OllamaError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to serialize/deserialize JSON
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Server answered with a non-success status
    #[error("Ollama API error: {0}")]
    ApiError(String),

    /// Model not found or not pulled
    #[error("Model not found: {0}. Try running 'ollama pull {0}'")]
    ModelNotFound(String),

    /// Request timeout
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Response parsed but carried no usable completion
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Connection refused (server not running)
    #[error("Connection refused. Is Ollama running at {0}?")]
    ConnectionRefused(String),
}

impl OllamaError {
    /// Check if this error is retryable (transient)
    pub fn is_retryable(&self) -> bool {
        match self {
            OllamaError::Timeout(_) | OllamaError::ConnectionRefused(_) => true,
            OllamaError::HttpError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

/// Result type for chat-completion operations
pub type OllamaResult<T> = Result<T, OllamaError>;
