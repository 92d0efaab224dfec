//! Shared test utilities for the Curator workspace
//!
//! Mock HTTP servers for the two services the worker talks to, so client and
//! worker tests run without a real Plex server or language model.
//!
//! # Mock Services
//!
//! - [`MockPlexServer`] - Plex Media Server endpoints used by the collection pipeline
//! - [`MockOllamaServer`] - OpenAI-compatible chat completion endpoint
//!
//! # Example
//!
//! ```rust,ignore
//! use curator_test_utils::{MockOllamaServer, MockPlexServer};
//!
//! #[tokio::test]
//! async fn test_with_mocks() {
//!     let plex = MockPlexServer::start().await;
//!     plex.mock_identity().await;
//!     plex.mock_accounts().await;
//!
//!     let ollama = MockOllamaServer::start().await;
//!     ollama.mock_chat_success("Heat, Ronin +++ Crime thrillers").await;
//! }
//! ```

mod ollama;
mod plex;

pub use ollama::MockOllamaServer;
pub use plex::{MockPlexServer, PlexMovieFixture};
