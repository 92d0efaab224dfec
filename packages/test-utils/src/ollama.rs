//! Mock language model server speaking the OpenAI-compatible API
//!
//! Provides a [`MockOllamaServer`] that answers `/v1/chat/completions` and
//! `/v1/models` the way Ollama does.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHAT_PATH: &str = "/v1/chat/completions";

/// Mock Ollama server for recommendation tests
///
/// Wraps a [`wiremock::MockServer`]; every mounted mock records its requests,
/// so [`MockOllamaServer::chat_calls`] reports how often the model was asked.
///
/// # Example
///
/// ```rust,ignore
/// use curator_test_utils::MockOllamaServer;
///
/// #[tokio::test]
/// async fn test_recommendations() {
///     let server = MockOllamaServer::start().await;
///     server.mock_chat_success("Heat, Ronin +++ Tense crime dramas").await;
///     // Point OllamaConfig::with_url at server.url()
/// }
/// ```
pub struct MockOllamaServer {
    server: MockServer,
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "llama3.1",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

impl MockOllamaServer {
    /// Start a new mock server
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Get the server URL
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Get reference to the underlying mock server for custom mock setups
    pub fn inner(&self) -> &MockServer {
        &self.server
    }

    /// Answer every chat completion with `content`
    pub async fn mock_chat_success(&self, content: &str) {
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
            .mount(&self.server)
            .await;
    }

    /// Fail every chat completion with the given status
    pub async fn mock_chat_failure(&self, status_code: u16, error_message: &str) {
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .respond_with(ResponseTemplate::new(status_code).set_body_json(json!({
                "error": {"message": error_message, "type": "api_error"}
            })))
            .mount(&self.server)
            .await;
    }

    /// Reject chat completions because the model is not pulled
    pub async fn mock_model_not_found(&self, model: &str) {
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {
                    "message": format!("model \"{}\" not found, try pulling it first", model),
                    "type": "api_error"
                }
            })))
            .mount(&self.server)
            .await;
    }

    /// List the given models on `/v1/models`
    pub async fn mock_list_models(&self, models: &[&str]) {
        let data: Vec<serde_json::Value> = models
            .iter()
            .map(|id| json!({"id": id, "object": "model", "created": 0, "owned_by": "library"}))
            .collect();

        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": data
            })))
            .mount(&self.server)
            .await;
    }

    /// Delay chat completions by `delay_ms`
    pub async fn mock_timeout(&self, delay_ms: u64) {
        Mock::given(method("POST"))
            .and(path(CHAT_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(std::time::Duration::from_millis(delay_ms))
                    .set_body_json(completion_body("")),
            )
            .mount(&self.server)
            .await;
    }

    /// Number of chat completion requests received so far
    pub async fn chat_calls(&self) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == CHAT_PATH)
            .count()
    }

    /// Body of the most recent chat completion request
    pub async fn last_chat_request(&self) -> Option<serde_json::Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .rev()
            .find(|r| r.url.path() == CHAT_PATH)
            .and_then(|r| serde_json::from_slice(&r.body).ok())
    }
}
