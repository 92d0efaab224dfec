//! Plex Media Server API client for Curator
//!
//! Covers the slice of the Plex HTTP API the curator needs:
//! - Server identity and account lookup (`connect`)
//! - Library sections and per-account watch history
//! - Hub search
//! - Collection lookup, membership edits, summary edits and creation
//!
//! Every request carries `X-Plex-Token` and asks for JSON.
//!
//! # Example
//!
//! ```rust,no_run
//! use curator_plex_client::{MediaType, PlexClient};
//! use curator_shared_config::PlexConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PlexConfig::new("http://127.0.0.1:32400", "plex-token");
//! let plex = PlexClient::connect(&config).await?;
//!
//! let movies = plex.library_section("Movies").await?;
//! for event in plex.history(&movies, 10).await? {
//!     println!("watched {}", event.title);
//! }
//!
//! let hits = plex.search("Heat", MediaType::Movie, 3).await?;
//! println!("{} hits", hits.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod models;

pub use client::PlexClient;
pub use error::{PlexError, PlexResult};
pub use models::{Collection, LibrarySection, MediaItem, MediaType, ServerIdentity, WatchEvent};
