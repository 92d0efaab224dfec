//! Error handling for the Curator worker
//!
//! One variant per pipeline stage, so a failure tells the operator which step
//! of which library went wrong. Only `Authorization` stops the run loop.

use curator_ollama_client::OllamaError;
use curator_plex_client::PlexError;
use curator_shared_config::ConfigError;
use thiserror::Error;

/// Main worker error type
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Plex rejected the token or could not be reached at cycle start
    #[error("Plex authorization failed: {0}")]
    Authorization(String),

    /// Configured library name does not exist on the server
    #[error("library '{library}' could not be resolved: {reason}")]
    LibraryResolution { library: String, reason: String },

    /// Watch history could not be read
    #[error("failed to fetch watch history for '{library}': {reason}")]
    HistoryFetch { library: String, reason: String },

    /// The language model request failed
    #[error("recommendation request failed: {0}")]
    RecommendationRequest(String),

    /// The model answered without the expected delimiter
    #[error("malformed recommendation response: {0}")]
    MalformedResponse(String),

    /// Creating or updating the collection failed
    #[error("failed to reconcile collection '{collection}': {reason}")]
    Reconciliation { collection: String, reason: String },

    /// Missing or invalid configuration
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl WorkerError {
    /// Whether the run loop has to stop
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Authorization(_))
    }

    /// Get a severity level for logging
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Authorization(_) | Self::Configuration(_) => ErrorSeverity::Critical,

            Self::LibraryResolution { .. }
            | Self::HistoryFetch { .. }
            | Self::RecommendationRequest(_)
            | Self::Reconciliation { .. } => ErrorSeverity::Error,

            // The model sometimes ignores formatting instructions
            Self::MalformedResponse(_) => ErrorSeverity::Warning,
        }
    }

    /// Pipeline stage this error belongs to
    pub fn job_context(&self) -> &'static str {
        match self {
            Self::Authorization(_) => "connect",
            Self::LibraryResolution { .. } | Self::HistoryFetch { .. } => "history_sample",
            Self::RecommendationRequest(_) | Self::MalformedResponse(_) => "recommendation",
            Self::Reconciliation { .. } => "collection_sync",
            Self::Configuration(_) => "startup",
        }
    }

    /// Log the error with appropriate severity
    pub fn log(&self) {
        let context = self.job_context();
        match self.severity() {
            ErrorSeverity::Critical => {
                tracing::error!(
                    error = %self,
                    context = context,
                    fatal = self.is_fatal(),
                    "Critical worker error"
                );
            }
            ErrorSeverity::Error => {
                tracing::error!(error = %self, context = context, "Worker error");
            }
            ErrorSeverity::Warning => {
                tracing::warn!(error = %self, context = context, "Worker warning");
            }
        }
    }

    pub fn authorization(err: PlexError) -> Self {
        Self::Authorization(err.to_string())
    }

    pub fn library_resolution(library: impl Into<String>, err: PlexError) -> Self {
        Self::LibraryResolution {
            library: library.into(),
            reason: err.to_string(),
        }
    }

    pub fn history_fetch(library: impl Into<String>, err: PlexError) -> Self {
        Self::HistoryFetch {
            library: library.into(),
            reason: err.to_string(),
        }
    }

    pub fn reconciliation(collection: impl Into<String>, err: PlexError) -> Self {
        Self::Reconciliation {
            collection: collection.into(),
            reason: err.to_string(),
        }
    }
}

/// Error severity levels for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// The process cannot continue
    Critical,
    /// One library was skipped
    Error,
    /// Expected failures
    Warning,
}

/// Result type alias for worker operations
pub type WorkerResult<T> = Result<T, WorkerError>;

impl From<ConfigError> for WorkerError {
    fn from(err: ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<OllamaError> for WorkerError {
    fn from(err: OllamaError) -> Self {
        Self::RecommendationRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_only_authorization_is_fatal() {
        assert!(WorkerError::Authorization("401".into()).is_fatal());
        assert!(!WorkerError::MalformedResponse("no delimiter".into()).is_fatal());
        assert!(!WorkerError::Configuration("x".into()).is_fatal());
        assert!(!WorkerError::Reconciliation {
            collection: "AI Picks".into(),
            reason: "boom".into()
        }
        .is_fatal());
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(
            WorkerError::Authorization("x".into()).severity(),
            ErrorSeverity::Critical
        );
        assert_eq!(
            WorkerError::RecommendationRequest("x".into()).severity(),
            ErrorSeverity::Error
        );
        assert_eq!(
            WorkerError::MalformedResponse("x".into()).severity(),
            ErrorSeverity::Warning
        );
    }

    #[test]
    fn test_job_context() {
        let err = WorkerError::history_fetch("Movies", PlexError::Timeout(30));
        assert_eq!(err.job_context(), "history_sample");
        assert!(err.to_string().contains("Movies"));
    }

    #[test]
    fn test_from_config_error() {
        let err: WorkerError = ConfigError::MissingEnvVar("PLEX_URL".into()).into();
        assert_matches!(err, WorkerError::Configuration(msg) if msg.contains("PLEX_URL"));
    }

    #[test]
    fn test_from_ollama_error() {
        let err: WorkerError = OllamaError::ModelNotFound("llama3.1".into()).into();
        assert_matches!(err, WorkerError::RecommendationRequest(_));
    }

    #[test]
    fn test_authorization_from_plex_error() {
        let err = WorkerError::authorization(PlexError::Unauthorized(401));
        assert_matches!(err, WorkerError::Authorization(msg) if msg.contains("401"));
    }
}
