//! Configuration error types

use thiserror::Error;

/// Errors raised while reading the process environment at startup
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required variable is not set
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Variable is set but only contains whitespace
    #[error("environment variable {0} must not be empty")]
    EmptyValue(String),

    /// Variable could not be parsed into the expected type
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),

    /// Variable is not an absolute http(s) URL
    #[error("invalid URL format for {0}: {1}")]
    InvalidUrl(String, String),

    /// Values parsed fine but violate a cross-field or range rule
    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
