//! Chat-completion client for Curator
//!
//! Talks to a locally hosted model through the OpenAI-compatible endpoints
//! that Ollama exposes under `/v1`. Only single-shot, non-streaming
//! completions are supported: one request carries the whole conversation and
//! one response carries one completion text.
//!
//! # Requirements
//!
//! - Ollama (or another OpenAI-compatible server) reachable at the configured URL
//! - The chat model pulled before use:
//!   ```bash
//!   ollama pull llama3.1
//!   ```
//!
//! # Example
//!
//! ```no_run
//! use curator_ollama_client::{ChatMessage, OllamaClient};
//! use curator_shared_config::OllamaConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new(&OllamaConfig::default())?;
//!
//! let reply = client
//!     .chat(vec![ChatMessage::user("Recommend three heist movies.")])
//!     .await?;
//! println!("{}", reply);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod models;

pub use client::OllamaClient;
pub use error::{OllamaError, OllamaResult};
pub use models::{
    ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ChatRole,
    ListModelsResponse, ModelInfo,
};
