//! HTTP client for the OpenAI-compatible chat-completion API

use std::future::Future;
use std::time::Duration;

use curator_shared_config::OllamaConfig;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{OllamaError, OllamaResult};
use crate::models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ListModelsResponse};

/// Maximum error body size to prevent memory exhaustion
const MAX_ERROR_BODY_SIZE: usize = 1000;

/// Base delay for exponential backoff (milliseconds)
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;

/// Chat-completion client with connection pooling
#[derive(Clone)]
pub struct OllamaClient {
    http_client: Client,
    config: OllamaConfig,
    /// Extra attempts for transient failures
    max_retries: u32,
    /// Base delay for exponential backoff (milliseconds)
    retry_base_delay_ms: u64,
}

impl std::fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaClient")
            .field("url", &self.config.url)
            .field("model", &self.config.model)
            .field("api_key", &"[REDACTED]")
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl OllamaClient {
    /// Create a new client from configuration
    pub fn new(config: &OllamaConfig) -> OllamaResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(OllamaError::HttpError)?;

        Ok(Self {
            http_client,
            config: config.clone(),
            max_retries: config.max_retries,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
        })
    }

    /// Set retry configuration
    pub fn with_retry_config(mut self, max_retries: u32, base_delay_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_base_delay_ms = base_delay_ms;
        self
    }

    /// Execute an operation, retrying transient failures with exponential backoff
    async fn with_retry<T, F, Fut>(&self, operation: F) -> OllamaResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = OllamaResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.retry_base_delay_ms * 2_u64.pow(attempt);
                    attempt += 1;
                    warn!(
                        attempt = attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay,
                        error = %e,
                        "Retrying after transient error"
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Truncate error body to prevent memory exhaustion
    /// Safely handles UTF-8 boundaries to avoid panics on multi-byte characters
    fn truncate_error_body(body: String) -> String {
        if body.len() <= MAX_ERROR_BODY_SIZE {
            return body;
        }

        let truncate_at = body
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|i| *i <= MAX_ERROR_BODY_SIZE)
            .last()
            .unwrap_or(0);

        format!("{}... (truncated)", &body[..truncate_at])
    }

    fn map_send_error(&self, e: reqwest::Error) -> OllamaError {
        if e.is_connect() {
            OllamaError::ConnectionRefused(self.config.url.clone())
        } else if e.is_timeout() {
            OllamaError::Timeout(self.config.timeout_secs)
        } else {
            OllamaError::HttpError(e)
        }
    }

    /// List model names the server can serve
    pub async fn list_models(&self) -> OllamaResult<Vec<String>> {
        let response = self
            .http_client
            .get(self.config.models_url())
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = Self::truncate_error_body(response.text().await.unwrap_or_default());
            return Err(OllamaError::ApiError(format!("Status {}: {}", status, body)));
        }

        let list: ListModelsResponse = response.json().await?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }

    /// Check whether the configured model is available, ignoring the `:tag` suffix
    pub async fn has_model(&self) -> OllamaResult<bool> {
        let models = self.list_models().await?;
        let wanted = self.config.model.as_str();
        let wanted_base = wanted.split(':').next().unwrap_or(wanted);

        Ok(models.iter().any(|m| {
            let m_base = m.split(':').next().unwrap_or(m);
            m_base == wanted_base
        }))
    }

    /// Single chat request, no retry
    async fn chat_internal(&self, messages: &[ChatMessage]) -> OllamaResult<String> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: messages.to_vec(),
            stream: false,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .http_client
            .post(self.config.chat_completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = Self::truncate_error_body(response.text().await.unwrap_or_default());

            if body.contains("model") && body.contains("not found") {
                return Err(OllamaError::ModelNotFound(self.config.model.clone()));
            }

            return Err(OllamaError::ApiError(format!("Status {}: {}", status, body)));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .first_content()
            .map(str::to_string)
            .ok_or_else(|| OllamaError::InvalidResponse("completion has no choices".to_string()))
    }

    /// Send a conversation and return the text of the single completion
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> OllamaResult<String> {
        debug!(
            model = %self.config.model,
            message_count = messages.len(),
            "Sending chat request"
        );

        let result = self
            .with_retry(|| {
                let messages = messages.clone();
                async move { self.chat_internal(&messages).await }
            })
            .await?;

        debug!(response_len = result.len(), "Chat response received");

        Ok(result)
    }
}
