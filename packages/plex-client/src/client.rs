//! Plex API client implementation

use std::fmt;
use std::time::Duration;

use curator_shared_config::PlexConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::error::{PlexError, PlexResult};
use crate::models::{
    Collection, Envelope, LibrarySection, MediaContainer, MediaItem, MediaType, ServerIdentity,
    WatchEvent,
};

/// Default connection timeout in seconds
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Maximum error body size kept in error messages
const MAX_ERROR_BODY_SIZE: usize = 500;

/// Client identifier sent to Plex so the device shows up consistently
const CLIENT_IDENTIFIER: &str = "curator-worker";

/// Product name sent to Plex
const PRODUCT_NAME: &str = "Curator";

/// Plex library provider id used in `server://` item URIs
const LIBRARY_PROVIDER: &str = "com.plexapp.plugins.library";

/// An authenticated connection to one Plex server
///
/// Built by [`PlexClient::connect`], which verifies the token and resolves
/// the account whose history is read.
#[derive(Clone)]
pub struct PlexClient {
    http_client: Client,
    config: PlexConfig,
    identity: ServerIdentity,
    account_id: u64,
}

impl fmt::Debug for PlexClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlexClient")
            .field("url", &self.config.url)
            .field("token", &"[REDACTED]")
            .field("machine_identifier", &self.identity.machine_identifier)
            .field("account_id", &self.account_id)
            .finish()
    }
}

impl PlexClient {
    /// Connect to the server, verify the token and pick the history account
    ///
    /// # Errors
    /// - `PlexError::Unauthorized` if the token is rejected
    /// - `PlexError::ConnectionRefused` / `PlexError::Timeout` if the server is unreachable
    #[instrument(skip(config), fields(url = %config.url))]
    pub async fn connect(config: &PlexConfig) -> PlexResult<Self> {
        let http_client = Self::build_http_client(config)?;

        let container = Self::fetch(&http_client, config, Method::GET, "/", &[]).await?;
        let identity = ServerIdentity {
            machine_identifier: container.machine_identifier.ok_or_else(|| {
                PlexError::InvalidResponse("server identity lacks machineIdentifier".to_string())
            })?,
            version: container.version,
        };

        let account_id = match config.account_id {
            Some(id) => id,
            None => Self::resolve_account_id(&http_client, config).await?,
        };

        debug!(
            machine_identifier = %identity.machine_identifier,
            version = identity.version.as_deref().unwrap_or("unknown"),
            account_id,
            "Plex session established"
        );

        Ok(Self {
            http_client,
            config: config.clone(),
            identity,
            account_id,
        })
    }

    fn build_http_client(config: &PlexConfig) -> PlexResult<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            "X-Plex-Client-Identifier",
            HeaderValue::from_static(CLIENT_IDENTIFIER),
        );
        headers.insert("X-Plex-Product", HeaderValue::from_static(PRODUCT_NAME));
        let mut token = HeaderValue::from_str(&config.token)
            .map_err(|_| PlexError::InvalidInput("token contains invalid characters".to_string()))?;
        token.set_sensitive(true);
        headers.insert("X-Plex-Token", token);

        Ok(Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .build()?)
    }

    /// The server's system accounts start with the internal account 0;
    /// the owner is the first real account after it.
    async fn resolve_account_id(http_client: &Client, config: &PlexConfig) -> PlexResult<u64> {
        let container = Self::fetch(http_client, config, Method::GET, "/accounts", &[]).await?;
        let account = container
            .account
            .into_iter()
            .find(|a| a.id > 0)
            .ok_or_else(|| PlexError::InvalidResponse("server lists no user accounts".to_string()))?;

        debug!(
            account_id = account.id,
            account_name = account.name.as_deref().unwrap_or(""),
            "Resolved history account"
        );
        Ok(account.id)
    }

    /// Server identity captured at connect time
    pub fn identity(&self) -> &ServerIdentity {
        &self.identity
    }

    /// Account whose history is read
    pub fn account_id(&self) -> u64 {
        self.account_id
    }

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

    fn map_send_error(config: &PlexConfig, e: reqwest::Error) -> PlexError {
        if e.is_connect() {
            PlexError::ConnectionRefused(config.url.clone())
        } else if e.is_timeout() {
            PlexError::Timeout(config.timeout_secs)
        } else {
            PlexError::Http(e)
        }
    }

    async fn send(
        config: &PlexConfig,
        request: RequestBuilder,
        path: &str,
    ) -> PlexResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| Self::map_send_error(config, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(PlexError::Unauthorized(status.as_u16()))
            }
            StatusCode::NOT_FOUND => Err(PlexError::Api {
                status: status.as_u16(),
                message: format!("no such endpoint {}", path),
            }),
            _ => {
                let body = Self::truncate_error_body(response.text().await.unwrap_or_default());
                Err(PlexError::Api {
                    status: status.as_u16(),
                    message: body,
                })
            }
        }
    }

    async fn fetch(
        http_client: &Client,
        config: &PlexConfig,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> PlexResult<MediaContainer> {
        let request = http_client
            .request(method, config.endpoint(path))
            .query(query);
        let response = Self::send(config, request, path).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(MediaContainer::default());
        }
        let envelope: Envelope = parse_json(&text)?;
        Ok(envelope.media_container)
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> PlexResult<MediaContainer> {
        Self::fetch(&self.http_client, &self.config, method, path, query).await
    }

    /// `server://` URI addressing the given items
    fn items_uri(&self, items: &[MediaItem]) -> String {
        let keys: Vec<&str> = items.iter().map(|i| i.rating_key.as_str()).collect();
        format!(
            "server://{}/{}/library/metadata/{}",
            self.identity.machine_identifier,
            LIBRARY_PROVIDER,
            keys.join(",")
        )
    }

    /// Look up a library section by its exact title
    ///
    /// # Errors
    /// - `PlexError::NotFound` if no section carries that title
    #[instrument(skip(self))]
    pub async fn library_section(&self, name: &str) -> PlexResult<LibrarySection> {
        let container = self.request(Method::GET, "/library/sections", &[]).await?;
        container
            .directory
            .into_iter()
            .find(|d| d.title == name)
            .map(LibrarySection::from)
            .ok_or_else(|| PlexError::NotFound(format!("library section '{}'", name)))
    }

    /// Most recent watch events for the connected account in one section, newest first
    #[instrument(skip(self, section), fields(section = %section.title))]
    pub async fn history(
        &self,
        section: &LibrarySection,
        max_results: usize,
    ) -> PlexResult<Vec<WatchEvent>> {
        let account = self.account_id.to_string();
        let size = max_results.to_string();
        let container = self
            .request(
                Method::GET,
                "/status/sessions/history/all",
                &[
                    ("librarySectionID", section.key.as_str()),
                    ("accountID", account.as_str()),
                    ("sort", "viewedAt:desc"),
                    ("X-Plex-Container-Start", "0"),
                    ("X-Plex-Container-Size", size.as_str()),
                ],
            )
            .await?;

        let events: Vec<WatchEvent> = container
            .metadata
            .into_iter()
            .take(max_results)
            .map(WatchEvent::from)
            .collect();

        debug!(count = events.len(), "Fetched watch history");
        Ok(events)
    }

    /// Server-wide hub search restricted to one media type
    ///
    /// Results keep Plex's relevance order and are cut to `limit`.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        mediatype: MediaType,
        limit: usize,
    ) -> PlexResult<Vec<MediaItem>> {
        if query.trim().is_empty() {
            return Err(PlexError::InvalidInput("search query cannot be empty".to_string()));
        }
        let limit_str = limit.to_string();
        let container = self
            .request(
                Method::GET,
                "/hubs/search",
                &[("query", query), ("limit", limit_str.as_str())],
            )
            .await?;

        let items: Vec<MediaItem> = container
            .hub
            .into_iter()
            .filter(|hub| hub.kind == Some(mediatype))
            .flat_map(|hub| hub.metadata)
            .filter_map(|m| m.into_media_item())
            .filter(|item| item.kind == mediatype)
            .take(limit)
            .collect();

        debug!(result_count = items.len(), "Search completed");
        Ok(items)
    }

    /// Find a collection in a section by title (case-insensitive exact match)
    ///
    /// # Errors
    /// - `PlexError::NotFound` if the section has no collection with that title
    #[instrument(skip(self, section), fields(section = %section.title))]
    pub async fn collection(&self, section: &LibrarySection, title: &str) -> PlexResult<Collection> {
        let path = format!("/library/sections/{}/collections", section.key);
        let container = self.request(Method::GET, &path, &[("title", title)]).await?;

        let wanted = title.to_lowercase();
        container
            .metadata
            .into_iter()
            .filter(|m| {
                m.title
                    .as_deref()
                    .map(|t| t.to_lowercase() == wanted)
                    .unwrap_or(false)
            })
            .find_map(|m| m.into_collection(&section.key))
            .ok_or_else(|| PlexError::NotFound(format!("collection '{}'", title)))
    }

    /// Current members of a collection
    pub async fn collection_items(&self, collection: &Collection) -> PlexResult<Vec<MediaItem>> {
        let path = format!("/library/collections/{}/children", collection.rating_key);
        let container = self.request(Method::GET, &path, &[]).await?;
        Ok(container
            .metadata
            .into_iter()
            .filter_map(|m| m.into_media_item())
            .collect())
    }

    /// Remove items from a collection, one request per item
    pub async fn remove_items(&self, collection: &Collection, items: &[MediaItem]) -> PlexResult<()> {
        for item in items {
            let path = format!(
                "/library/collections/{}/items/{}",
                collection.rating_key, item.rating_key
            );
            self.request(Method::DELETE, &path, &[]).await?;
        }
        debug!(removed = items.len(), collection = %collection.title, "Removed collection items");
        Ok(())
    }

    /// Add items to a collection in a single request
    pub async fn add_items(&self, collection: &Collection, items: &[MediaItem]) -> PlexResult<()> {
        if items.is_empty() {
            return Ok(());
        }
        let path = format!("/library/collections/{}/items", collection.rating_key);
        let uri = self.items_uri(items);
        self.request(Method::PUT, &path, &[("uri", uri.as_str())]).await?;
        debug!(added = items.len(), collection = %collection.title, "Added collection items");
        Ok(())
    }

    /// Overwrite and lock a collection's summary
    pub async fn edit_summary(&self, collection: &Collection, summary: &str) -> PlexResult<()> {
        let path = format!("/library/sections/{}/all", collection.section_key);
        let collection_type = MediaType::Collection
            .type_id()
            .map(|id| id.to_string())
            .unwrap_or_default();
        self.request(
            Method::PUT,
            &path,
            &[
                ("type", collection_type.as_str()),
                ("id", collection.rating_key.as_str()),
                ("summary.value", summary),
                ("summary.locked", "1"),
            ],
        )
        .await?;
        Ok(())
    }

    /// Create a regular (non-smart) collection seeded with `items`
    ///
    /// # Errors
    /// - `PlexError::InvalidInput` if `items` is empty; Plex cannot create an empty collection
    #[instrument(skip(self, section, items), fields(section = %section.title, items = items.len()))]
    pub async fn create_collection(
        &self,
        title: &str,
        section: &LibrarySection,
        items: &[MediaItem],
    ) -> PlexResult<Collection> {
        let first = items.first().ok_or_else(|| {
            PlexError::InvalidInput("cannot create a collection without items".to_string())
        })?;
        let item_type = first
            .kind
            .type_id()
            .or_else(|| section.kind.type_id())
            .unwrap_or(1)
            .to_string();
        let uri = self.items_uri(items);

        let container = self
            .request(
                Method::POST,
                "/library/collections",
                &[
                    ("type", item_type.as_str()),
                    ("title", title),
                    ("smart", "0"),
                    ("sectionId", section.key.as_str()),
                    ("uri", uri.as_str()),
                ],
            )
            .await?;

        container
            .metadata
            .into_iter()
            .find_map(|m| m.into_collection(&section.key))
            .ok_or_else(|| {
                PlexError::InvalidResponse("collection creation returned no metadata".to_string())
            })
    }
}

fn parse_json<T: DeserializeOwned>(text: &str) -> PlexResult<T> {
    serde_json::from_str(text).map_err(PlexError::from)
}
