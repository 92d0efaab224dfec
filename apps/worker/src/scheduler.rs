//! Run loop
//!
//! Each cycle opens a fresh Plex session, runs the pipeline for every
//! configured library and then sleeps for the configured interval.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, info_span, Instrument};

use crate::config::Config;
use crate::error::{WorkerError, WorkerResult};
use crate::jobs::collection_sync::{self, CollectionSyncJob, ReconcileOutcome};
use crate::jobs::{history_sample, recommendation, title_resolution};
use crate::services::{CompletionBackend, MediaServerConnector};

/// Pause between cycles
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Why a library was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Nothing watched yet
    EmptyHistory,
    /// The model answered with an empty title list
    NoRecommendations,
}

/// What happened to one library in one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryOutcome {
    Skipped(SkipReason),
    Reconciled(ReconcileOutcome),
}

/// Per-library results of one cycle, in configuration order
pub type CycleReport = Vec<(String, WorkerResult<LibraryOutcome>)>;

/// Drives the pipeline on a fixed interval
pub struct Scheduler<'a, C, B, Z> {
    config: &'a Config,
    connector: C,
    backend: B,
    sleeper: Z,
    max_cycles: Option<usize>,
}

impl<'a, C, B, Z> Scheduler<'a, C, B, Z>
where
    C: MediaServerConnector,
    B: CompletionBackend,
    Z: Sleeper,
{
    pub fn new(config: &'a Config, connector: C, backend: B, sleeper: Z) -> Self {
        Self {
            config,
            connector,
            backend,
            sleeper,
            max_cycles: None,
        }
    }

    /// Stop after `cycles` runs instead of looping forever
    pub fn with_max_cycles(mut self, cycles: usize) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    /// Run cycles until the cycle limit is reached
    ///
    /// Returns early only on a fatal error.
    pub async fn run(&self) -> WorkerResult<()> {
        let mut completed = 0usize;
        loop {
            self.run_cycle().await?;
            completed += 1;

            if self.max_cycles.is_some_and(|max| completed >= max) {
                return Ok(());
            }

            info!("Waiting on next call...");
            self.sleeper.sleep(self.config.wait_duration()).await;
        }
    }

    /// One pass over every configured library
    ///
    /// Library failures are logged and recorded; a failed connection aborts
    /// the cycle with `WorkerError::Authorization`.
    pub async fn run_cycle(&self) -> WorkerResult<CycleReport> {
        info!("Starting collection run");

        let server = match self.connector.connect().await {
            Ok(server) => server,
            Err(e) => {
                let err = WorkerError::authorization(e);
                err.log();
                return Err(err);
            }
        };
        info!("Connected to Plex server");

        let mut report = Vec::with_capacity(self.config.library_names.len());
        for library in &self.config.library_names {
            let result = async {
                let result = self.run_library(&server, library).await;
                match &result {
                    Ok(outcome) => info!(outcome = ?outcome, "Library processed"),
                    Err(e) => e.log(),
                }
                result
            }
            .instrument(info_span!("library", library = %library))
            .await;
            report.push((library.clone(), result));
        }
        Ok(report)
    }

    /// Full pipeline for one library
    pub async fn run_library(
        &self,
        server: &C::Server,
        library: &str,
    ) -> WorkerResult<LibraryOutcome> {
        info!("Fetching items from your watch history in library {}", library);
        let sample =
            history_sample::execute(server, library, self.config.history_amount).await?;

        info!("Querying Ollama for recommendations for library {}...", library);
        let response = match recommendation::execute(
            &self.backend,
            &sample.titles,
            self.config.recommended_amount,
        )
        .await?
        {
            Some(response) => response,
            None => return Ok(LibraryOutcome::Skipped(SkipReason::EmptyHistory)),
        };
        info!("Query success!");

        if response.titles.is_empty() {
            return Ok(LibraryOutcome::Skipped(SkipReason::NoRecommendations));
        }

        let items = title_resolution::execute(server, &response.titles).await;

        let job = CollectionSyncJob {
            section: &sample.section,
            collection_title: &self.config.collection_title,
            summary: &response.rationale,
            minimum_amount: self.config.minimum_amount,
        };
        let outcome = collection_sync::execute(server, &job, &items).await?;
        Ok(LibraryOutcome::Reconciled(outcome))
    }
}
