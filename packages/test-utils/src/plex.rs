//! Mock Plex Media Server for testing the collection pipeline
//!
//! Provides a [`MockPlexServer`] that simulates the Plex endpoints used for
//! history sampling, title search and collection maintenance.

use serde_json::json;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock Plex server
///
/// Wraps a [`wiremock::MockServer`]. Every mock except
/// [`MockPlexServer::mock_auth_failure`] only matches requests carrying the
/// server's token in `X-Plex-Token`.
///
/// # Example
///
/// ```rust,ignore
/// use curator_test_utils::{MockPlexServer, PlexMovieFixture};
///
/// #[tokio::test]
/// async fn test_search() {
///     let server = MockPlexServer::start().await;
///     server.mock_identity().await;
///     server.mock_accounts().await;
///     server.mock_search("Heat", &[PlexMovieFixture::new("501", "Heat", 1995)]).await;
///
///     // Configure PlexConfig::new(server.url(), server.token())
/// }
/// ```
pub struct MockPlexServer {
    server: MockServer,
    token: String,
    machine_identifier: String,
}

/// A movie as Plex returns it in search hubs and collection listings
#[derive(Debug, Clone)]
pub struct PlexMovieFixture {
    pub rating_key: String,
    pub title: String,
    pub year: u32,
}

impl PlexMovieFixture {
    pub fn new(rating_key: &str, title: &str, year: u32) -> Self {
        Self {
            rating_key: rating_key.to_string(),
            title: title.to_string(),
            year,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "ratingKey": self.rating_key,
            "key": format!("/library/metadata/{}", self.rating_key),
            "type": "movie",
            "title": self.title,
            "year": self.year,
            "librarySectionID": 1,
        })
    }
}

fn container(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "MediaContainer": body }))
}

impl MockPlexServer {
    /// Start a new mock Plex server with a default token
    pub async fn start() -> Self {
        Self::start_with_token("test-plex-token").await
    }

    /// Start a new mock Plex server with a custom token
    pub async fn start_with_token(token: &str) -> Self {
        Self {
            server: MockServer::start().await,
            token: token.to_string(),
            machine_identifier: "mock-machine-0001".to_string(),
        }
    }

    /// Get the server URL
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Get the accepted token
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Machine identifier reported by `GET /`
    pub fn machine_identifier(&self) -> &str {
        &self.machine_identifier
    }

    /// Get reference to the underlying mock server for custom mock setups
    pub fn inner(&self) -> &MockServer {
        &self.server
    }

    fn authed(&self, verb: &str, route: &str) -> wiremock::MockBuilder {
        Mock::given(method(verb))
            .and(path(route))
            .and(header("X-Plex-Token", self.token.as_str()))
    }

    /// Mount `GET /` returning the server identity
    pub async fn mock_identity(&self) {
        self.authed("GET", "/")
            .respond_with(container(json!({
                "machineIdentifier": self.machine_identifier,
                "version": "1.40.0.7998",
                "friendlyName": "mock"
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount `GET /accounts` with the system account and one owner (id 1)
    pub async fn mock_accounts(&self) {
        self.authed("GET", "/accounts")
            .respond_with(container(json!({
                "size": 2,
                "Account": [
                    {"id": 0, "name": ""},
                    {"id": 1, "name": "owner"}
                ]
            })))
            .mount(&self.server)
            .await;
    }

    /// Answer any request made with `bad_token` with 401
    pub async fn mock_auth_failure(&self, bad_token: &str) {
        Mock::given(path_regex(".*"))
            .and(header("X-Plex-Token", bad_token))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&self.server)
            .await;
    }

    /// Mount `GET /library/sections` with `(key, title, type)` entries
    pub async fn mock_sections(&self, sections: &[(&str, &str, &str)]) {
        let directories: Vec<serde_json::Value> = sections
            .iter()
            .map(|(key, title, kind)| json!({"key": key, "title": title, "type": kind}))
            .collect();

        self.authed("GET", "/library/sections")
            .respond_with(container(json!({
                "size": directories.len(),
                "Directory": directories
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount the history endpoint for one section, newest entry first
    pub async fn mock_history(&self, section_key: &str, titles: &[&str]) {
        let now: i64 = 1_700_000_000;
        let entries: Vec<serde_json::Value> = titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                json!({
                    "historyKey": format!("/status/sessions/history/{}", i + 1),
                    "ratingKey": format!("{}", 100 + i),
                    "title": title,
                    "type": "movie",
                    "viewedAt": now - (i as i64) * 3600,
                    "accountID": 1,
                    "librarySectionID": section_key
                })
            })
            .collect();

        self.authed("GET", "/status/sessions/history/all")
            .and(query_param("librarySectionID", section_key))
            .and(query_param("sort", "viewedAt:desc"))
            .respond_with(container(json!({
                "size": entries.len(),
                "Metadata": entries
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount `GET /hubs/search` for `query` with a movie hub holding `movies`
    ///
    /// A show hub is always included so type filtering gets exercised.
    pub async fn mock_search(&self, query: &str, movies: &[PlexMovieFixture]) {
        let metadata: Vec<serde_json::Value> = movies.iter().map(|m| m.to_json()).collect();

        self.authed("GET", "/hubs/search")
            .and(query_param("query", query))
            .respond_with(container(json!({
                "size": 2,
                "Hub": [
                    {
                        "hubIdentifier": "show",
                        "type": "show",
                        "size": 1,
                        "Metadata": [{
                            "ratingKey": "9001",
                            "type": "show",
                            "title": format!("{} (TV)", query)
                        }]
                    },
                    {
                        "hubIdentifier": "movie",
                        "type": "movie",
                        "size": metadata.len(),
                        "Metadata": metadata
                    }
                ]
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a collection lookup in `section_key` that finds one collection
    pub async fn mock_collection(&self, section_key: &str, rating_key: &str, title: &str) {
        self.authed("GET", &format!("/library/sections/{}/collections", section_key))
            .respond_with(container(json!({
                "size": 1,
                "Metadata": [{
                    "ratingKey": rating_key,
                    "type": "collection",
                    "subtype": "movie",
                    "title": title,
                    "summary": "",
                    "childCount": 0,
                    "librarySectionID": section_key.parse::<u64>().unwrap_or(1)
                }]
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a collection lookup in `section_key` that finds nothing
    pub async fn mock_no_collections(&self, section_key: &str) {
        self.authed("GET", &format!("/library/sections/{}/collections", section_key))
            .respond_with(container(json!({"size": 0})))
            .mount(&self.server)
            .await;
    }

    /// Mount `GET /library/collections/{key}/children`
    pub async fn mock_collection_children(&self, rating_key: &str, movies: &[PlexMovieFixture]) {
        let metadata: Vec<serde_json::Value> = movies.iter().map(|m| m.to_json()).collect();

        self.authed("GET", &format!("/library/collections/{}/children", rating_key))
            .respond_with(container(json!({
                "size": metadata.len(),
                "Metadata": metadata
            })))
            .mount(&self.server)
            .await;
    }

    /// Accept removals, additions and summary edits for a collection
    pub async fn mock_collection_writes(&self, section_key: &str, rating_key: &str) {
        Mock::given(method("DELETE"))
            .and(path_regex(format!(
                "^/library/collections/{}/items/[^/]+$",
                rating_key
            )))
            .and(header("X-Plex-Token", self.token.as_str()))
            .respond_with(container(json!({"size": 0})))
            .mount(&self.server)
            .await;

        self.authed("PUT", &format!("/library/collections/{}/items", rating_key))
            .respond_with(container(json!({"size": 0})))
            .mount(&self.server)
            .await;

        self.authed("PUT", &format!("/library/sections/{}/all", section_key))
            .and(query_param("id", rating_key))
            .respond_with(ResponseTemplate::new(200))
            .mount(&self.server)
            .await;
    }

    /// Mount `POST /library/collections` returning a new collection
    pub async fn mock_create_collection(&self, section_key: &str, rating_key: &str, title: &str) {
        self.authed("POST", "/library/collections")
            .and(query_param("sectionId", section_key))
            .respond_with(container(json!({
                "size": 1,
                "Metadata": [{
                    "ratingKey": rating_key,
                    "type": "collection",
                    "title": title,
                    "librarySectionID": section_key.parse::<u64>().unwrap_or(1)
                }]
            })))
            .mount(&self.server)
            .await;
    }

    /// Fail every request under `route_prefix` with a 500
    pub async fn mock_server_error(&self, route_prefix: &str, message: &str) {
        Mock::given(path_regex(format!("^{}", route_prefix)))
            .and(header("X-Plex-Token", self.token.as_str()))
            .respond_with(ResponseTemplate::new(500).set_body_string(message))
            .mount(&self.server)
            .await;
    }

    /// Requests received with the given method whose path starts with `prefix`
    pub async fn requests_to(&self, verb: &str, prefix: &str) -> Vec<wiremock::Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.method.to_string() == verb && r.url.path().starts_with(prefix))
            .collect()
    }
}
