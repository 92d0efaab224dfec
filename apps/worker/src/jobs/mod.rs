//! Pipeline stages run once per library and cycle
//!
//! - [`history_sample`]: read the most recent watch history
//! - [`recommendation`]: ask the model for titles and a rationale
//! - [`title_resolution`]: map recommended titles onto library items
//! - [`collection_sync`]: write the matched items into the collection

pub mod collection_sync;
pub mod history_sample;
pub mod recommendation;
pub mod title_resolution;
