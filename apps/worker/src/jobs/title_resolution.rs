//! Title resolution
//!
//! Maps recommended titles onto items of the library through Plex search.
//! The first search hit wins; there is no year or cast verification.

use std::collections::HashSet;

use curator_plex_client::{MediaItem, MediaType};
use tracing::{info, warn};

use crate::services::MediaServer;

/// Search results requested per title
pub const SEARCH_LIMIT: usize = 3;

/// A recommended title and the library item it resolved to, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedItem {
    /// Cleaned title used as the search query
    pub title: String,
    pub item: Option<MediaItem>,
}

/// Keep ASCII letters, digits and whitespace, then trim
pub fn clean_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Search for every title, in order
///
/// Search failures only cost the affected title.
pub async fn resolve<S>(server: &S, titles: &[String]) -> Vec<ResolvedItem>
where
    S: MediaServer + ?Sized,
{
    info!("Finding matching movies in your library...");

    let mut resolved = Vec::with_capacity(titles.len());
    for raw in titles {
        let title = clean_title(raw);
        let item = if title.is_empty() {
            None
        } else {
            match server.search(&title, MediaType::Movie, SEARCH_LIMIT).await {
                Ok(results) => results.into_iter().next(),
                Err(e) => {
                    warn!(title = %title, error = %e, "Search failed");
                    None
                }
            }
        };

        if item.is_some() {
            info!("{} - found", title);
        } else {
            info!("{} - not found", title);
        }
        resolved.push(ResolvedItem { title, item });
    }
    resolved
}

/// Matched items in first-seen order, each library item once
pub fn matched_items(resolved: &[ResolvedItem]) -> Vec<MediaItem> {
    let mut seen = HashSet::new();
    resolved
        .iter()
        .filter_map(|r| r.item.as_ref())
        .filter(|item| seen.insert(item.rating_key.clone()))
        .cloned()
        .collect()
}

/// Execute the title resolution job
pub async fn execute<S>(server: &S, titles: &[String]) -> Vec<MediaItem>
where
    S: MediaServer + ?Sized,
{
    matched_items(&resolve(server, titles).await)
}
