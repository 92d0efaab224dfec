//! Curator worker
//!
//! Periodically reads each configured Plex library's watch history, asks a
//! language model for similar movies and keeps a named collection in that
//! library in sync with the titles Plex can find.
//!
//! The pipeline per library:
//! 1. [`jobs::history_sample`] reads the most recent history
//! 2. [`jobs::recommendation`] asks the model and parses its answer
//! 3. [`jobs::title_resolution`] searches the library for each title
//! 4. [`jobs::collection_sync`] creates or rewrites the collection
//!
//! [`scheduler::Scheduler`] runs it for every library on a fixed interval.

pub mod config;
pub mod error;
pub mod jobs;
pub mod scheduler;
pub mod services;

pub use config::Config;
pub use error::{ErrorSeverity, WorkerError, WorkerResult};
pub use scheduler::{LibraryOutcome, Scheduler, SkipReason, Sleeper, TokioSleeper};
pub use services::{CompletionBackend, MediaServer, MediaServerConnector, PlexConnector};
