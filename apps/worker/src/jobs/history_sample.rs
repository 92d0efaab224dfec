//! Watch history sampling
//!
//! Resolves a library by name and returns the titles of its most recent
//! history entries, newest first.

use curator_plex_client::LibrarySection;
use tracing::{debug, info};

use crate::error::{WorkerError, WorkerResult};
use crate::services::MediaServer;

/// History of one library
#[derive(Debug, Clone)]
pub struct HistorySample {
    pub section: LibrarySection,
    /// Titles in history order; repeats are kept
    pub titles: Vec<String>,
}

/// Execute the history sampling job
///
/// An empty history is not an error; the caller decides to skip.
pub async fn execute<S>(server: &S, library: &str, history_amount: usize) -> WorkerResult<HistorySample>
where
    S: MediaServer + ?Sized,
{
    let section = server
        .library_section(library)
        .await
        .map_err(|e| WorkerError::library_resolution(library, e))?;

    let events = server
        .history(&section, history_amount)
        .await
        .map_err(|e| WorkerError::history_fetch(library, e))?;

    let titles: Vec<String> = events
        .into_iter()
        .take(history_amount)
        .map(|event| event.title)
        .filter(|title| !title.trim().is_empty())
        .collect();

    debug!(library = %library, count = titles.len(), "Sampled watch history");

    Ok(HistorySample { section, titles })
}

/// Join titles into the prompt fragment
pub fn join_titles(titles: &[String]) -> String {
    let joined = titles.join(", ");
    info!("Found {} to base recommendations off", joined);
    joined
}
