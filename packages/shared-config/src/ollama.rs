//! Language model endpoint configuration
//!
//! The worker talks to Ollama through its OpenAI-compatible `/v1` surface,
//! so any server speaking that protocol can be pointed at with `OLLAMA_URL`.

use crate::{get_env_or_default, parse_env, parse_optional_env, validate_url, ConfigResult};

/// Chat-completion service configuration
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Server base URL (without the `/v1` suffix)
    pub url: String,

    /// Chat model name (e.g., llama3.1)
    pub model: String,

    /// Bearer token; Ollama ignores it but OpenAI-style servers require one
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Retries for transient transport failures
    pub max_retries: u32,

    /// Sampling temperature; `None` leaves the server default
    pub temperature: Option<f32>,

    /// Cap on generated tokens; `None` leaves the server default
    pub max_tokens: Option<u32>,
}

impl OllamaConfig {
    /// Load model endpoint configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        let url = get_env_or_default("OLLAMA_URL", "http://localhost:11434");
        validate_url("OLLAMA_URL", &url)?;

        Ok(Self {
            url,
            model: get_env_or_default("OLLAMA_MODEL", "llama3.1"),
            api_key: get_env_or_default("OLLAMA_API_KEY", "ollama"),
            timeout_secs: parse_env("OLLAMA_TIMEOUT", 60)?,
            max_retries: parse_env("OLLAMA_MAX_RETRIES", 0)?,
            temperature: parse_optional_env("OLLAMA_TEMPERATURE")?,
            max_tokens: parse_optional_env("OLLAMA_MAX_TOKENS")?,
        })
    }

    /// Create a configuration with a custom URL (useful for testing)
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Full URL of the chat-completion endpoint
    pub fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.url.trim_end_matches('/'))
    }

    /// Full URL of the model listing endpoint
    pub fn models_url(&self) -> String {
        format!("{}/v1/models", self.url.trim_end_matches('/'))
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "llama3.1".to_string(),
            api_key: "ollama".to_string(),
            timeout_secs: 60,
            max_retries: 0,
            temperature: None,
            max_tokens: None,
        }
    }
}
