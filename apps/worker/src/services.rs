//! Boundaries between the pipeline and the outside world
//!
//! The jobs only see these traits, so tests can swap Plex and the model for
//! in-memory fakes.

use async_trait::async_trait;
use curator_ollama_client::{ChatMessage, OllamaClient, OllamaResult};
use curator_plex_client::{
    Collection, LibrarySection, MediaItem, MediaType, PlexClient, PlexResult, WatchEvent,
};
use curator_shared_config::PlexConfig;

/// Operations the pipeline needs from a media server session
#[async_trait]
pub trait MediaServer: Send + Sync {
    async fn library_section(&self, name: &str) -> PlexResult<LibrarySection>;

    /// Newest first, at most `max_results`
    async fn history(
        &self,
        section: &LibrarySection,
        max_results: usize,
    ) -> PlexResult<Vec<WatchEvent>>;

    async fn search(
        &self,
        query: &str,
        mediatype: MediaType,
        limit: usize,
    ) -> PlexResult<Vec<MediaItem>>;

    /// Must fail with `PlexError::NotFound` when no collection has that title
    async fn collection(&self, section: &LibrarySection, title: &str) -> PlexResult<Collection>;

    async fn collection_items(&self, collection: &Collection) -> PlexResult<Vec<MediaItem>>;

    async fn remove_items(&self, collection: &Collection, items: &[MediaItem]) -> PlexResult<()>;

    async fn add_items(&self, collection: &Collection, items: &[MediaItem]) -> PlexResult<()>;

    async fn edit_summary(&self, collection: &Collection, summary: &str) -> PlexResult<()>;

    async fn create_collection(
        &self,
        title: &str,
        section: &LibrarySection,
        items: &[MediaItem],
    ) -> PlexResult<Collection>;
}

/// Opens a fresh media server session at the start of every run
#[async_trait]
pub trait MediaServerConnector: Send + Sync {
    type Server: MediaServer;

    async fn connect(&self) -> PlexResult<Self::Server>;
}

/// Single-prompt text completion
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> OllamaResult<String>;
}

#[async_trait]
impl MediaServer for PlexClient {
    async fn library_section(&self, name: &str) -> PlexResult<LibrarySection> {
        PlexClient::library_section(self, name).await
    }

    async fn history(
        &self,
        section: &LibrarySection,
        max_results: usize,
    ) -> PlexResult<Vec<WatchEvent>> {
        PlexClient::history(self, section, max_results).await
    }

    async fn search(
        &self,
        query: &str,
        mediatype: MediaType,
        limit: usize,
    ) -> PlexResult<Vec<MediaItem>> {
        PlexClient::search(self, query, mediatype, limit).await
    }

    async fn collection(&self, section: &LibrarySection, title: &str) -> PlexResult<Collection> {
        PlexClient::collection(self, section, title).await
    }

    async fn collection_items(&self, collection: &Collection) -> PlexResult<Vec<MediaItem>> {
        PlexClient::collection_items(self, collection).await
    }

    async fn remove_items(&self, collection: &Collection, items: &[MediaItem]) -> PlexResult<()> {
        PlexClient::remove_items(self, collection, items).await
    }

    async fn add_items(&self, collection: &Collection, items: &[MediaItem]) -> PlexResult<()> {
        PlexClient::add_items(self, collection, items).await
    }

    async fn edit_summary(&self, collection: &Collection, summary: &str) -> PlexResult<()> {
        PlexClient::edit_summary(self, collection, summary).await
    }

    async fn create_collection(
        &self,
        title: &str,
        section: &LibrarySection,
        items: &[MediaItem],
    ) -> PlexResult<Collection> {
        PlexClient::create_collection(self, title, section, items).await
    }
}

/// Connects to the configured Plex server
#[derive(Debug, Clone)]
pub struct PlexConnector {
    config: PlexConfig,
}

impl PlexConnector {
    pub fn new(config: PlexConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl MediaServerConnector for PlexConnector {
    type Server = PlexClient;

    async fn connect(&self) -> PlexResult<PlexClient> {
        PlexClient::connect(&self.config).await
    }
}

#[async_trait]
impl CompletionBackend for OllamaClient {
    async fn complete(&self, prompt: &str) -> OllamaResult<String> {
        self.chat(vec![ChatMessage::user(prompt)]).await
    }
}
