//! Collection reconciliation
//!
//! Makes the configured collection hold exactly the matched items, creating
//! it when the library does not have one yet.

use std::collections::HashSet;

use curator_plex_client::{Collection, LibrarySection, MediaItem, PlexError};
use tracing::info;

use crate::error::{WorkerError, WorkerResult};
use crate::services::MediaServer;

/// What to write, and where
#[derive(Debug, Clone)]
pub struct CollectionSyncJob<'a> {
    pub section: &'a LibrarySection,
    pub collection_title: &'a str,
    /// Stored as the collection summary
    pub summary: &'a str,
    /// The collection is only touched when strictly more items matched
    pub minimum_amount: usize,
}

/// Result of one reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Too few matches; nothing was changed
    BelowThreshold { matched: usize, minimum: usize },
    /// Existing collection now holds exactly the matched items
    ///
    /// Counts are of members actually added and removed.
    Updated {
        collection: Collection,
        removed: usize,
        added: usize,
    },
    /// A new collection was created
    Created { collection: Collection, added: usize },
}

/// Split into items missing from the collection and members no longer wanted
fn membership_diff(current: &[MediaItem], wanted: &[MediaItem]) -> (Vec<MediaItem>, Vec<MediaItem>) {
    let present: HashSet<&str> = current.iter().map(|m| m.rating_key.as_str()).collect();
    let keep: HashSet<&str> = wanted.iter().map(|m| m.rating_key.as_str()).collect();

    let fresh = wanted
        .iter()
        .filter(|m| !present.contains(m.rating_key.as_str()))
        .cloned()
        .collect();
    let stale = current
        .iter()
        .filter(|m| !keep.contains(m.rating_key.as_str()))
        .cloned()
        .collect();
    (fresh, stale)
}

/// Execute the collection sync job
pub async fn execute<S>(
    server: &S,
    job: &CollectionSyncJob<'_>,
    items: &[MediaItem],
) -> WorkerResult<ReconcileOutcome>
where
    S: MediaServer + ?Sized,
{
    if items.len() <= job.minimum_amount {
        info!("Not enough movies were found");
        return Ok(ReconcileOutcome::BelowThreshold {
            matched: items.len(),
            minimum: job.minimum_amount,
        });
    }

    let fail = |e: PlexError| WorkerError::reconciliation(job.collection_title, e);

    match server.collection(job.section, job.collection_title).await {
        Ok(collection) => {
            let current = server.collection_items(&collection).await.map_err(fail)?;
            let (fresh, stale) = membership_diff(&current, items);

            // Stale members go only once the new ones are in place.
            server.add_items(&collection, &fresh).await.map_err(fail)?;
            server
                .remove_items(&collection, &stale)
                .await
                .map_err(fail)?;
            server
                .edit_summary(&collection, job.summary)
                .await
                .map_err(fail)?;

            info!(
                collection = %collection.title,
                removed = stale.len(),
                added = fresh.len(),
                "Updated pre-existing collection"
            );
            Ok(ReconcileOutcome::Updated {
                collection,
                removed: stale.len(),
                added: fresh.len(),
            })
        }
        Err(e) if e.is_not_found() => {
            let collection = server
                .create_collection(job.collection_title, job.section, items)
                .await
                .map_err(fail)?;
            server
                .edit_summary(&collection, job.summary)
                .await
                .map_err(fail)?;

            info!(
                collection = %collection.title,
                added = items.len(),
                "Added new collection"
            );
            Ok(ReconcileOutcome::Created {
                collection,
                added: items.len(),
            })
        }
        Err(e) => Err(fail(e)),
    }
}
