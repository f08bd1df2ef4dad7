//! Orchestrator module for the catalog indexer pipeline.
//!
//! Drives one pass over every change feed: detect, resolve, assemble, load.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use catalog_indexer_repository::{CatalogConnector, CatalogSource, ChangeFeed, CheckpointStore};
use catalog_indexer_shared::ChangeRecord;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::cursor::ChangeCursor;
use crate::errors::{OrchestratorError, ProcessorError};
use crate::loader::BulkLoader;
use crate::processor::DocumentAssembler;
use crate::resolver::RelationResolver;
use crate::retry::{log_backoff, retry_with_backoff, BackoffPolicy};

/// Counters of one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Changes handed out by the cursors.
    pub changes_detected: u64,
    /// Movie documents sent to the search index.
    pub movies_indexed: u64,
    /// Movies that no longer exist in the source.
    pub movies_skipped: u64,
}

/// State that survives a restarted run attempt.
struct RunState {
    cursors: Vec<ChangeCursor>,
    /// Movies already handled in this run, indexed or skipped.
    handled: HashSet<Uuid>,
    /// Change detected but not fully processed when the last attempt failed.
    pending: Option<ChangeRecord>,
    stats: RunStats,
}

/// Pipeline that moves catalog changes into the search index.
///
/// A run connects to the source, polls every cursor until it has nothing
/// left, in registration order, and rebuilds each affected movie at most
/// once. When the source connection is lost the run body starts over after
/// a backoff wait, with a new connection and the same run state.
pub struct Pipeline {
    connector: Arc<dyn CatalogConnector>,
    store: Arc<dyn CheckpointStore>,
    feeds: Vec<ChangeFeed>,
    resolver: RelationResolver,
    assembler: DocumentAssembler,
    loader: BulkLoader,
    backoff: BackoffPolicy,
    on_retry: fn(usize, Duration, &OrchestratorError),
}

impl Pipeline {
    /// Create a pipeline following `feeds`, in that order.
    pub fn new(
        connector: Arc<dyn CatalogConnector>,
        store: Arc<dyn CheckpointStore>,
        feeds: Vec<ChangeFeed>,
        loader: BulkLoader,
    ) -> Self {
        Self {
            connector,
            store,
            feeds,
            resolver: RelationResolver::new(),
            assembler: DocumentAssembler::new(),
            loader,
            backoff: BackoffPolicy::default(),
            on_retry: log_backoff,
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Replace the observer called before every backoff wait.
    pub fn on_retry(mut self, observer: fn(usize, Duration, &OrchestratorError)) -> Self {
        self.on_retry = observer;
        self
    }

    /// Run one pass over all feeds.
    ///
    /// Returns once every cursor is exhausted. Lost source connections are
    /// waited out; any other error ends the run, leaving the checkpoints
    /// persisted so far as the point the next run resumes from.
    #[instrument(skip(self), fields(feeds = self.feeds.len()))]
    pub async fn run(&self) -> Result<RunStats, OrchestratorError> {
        info!("Starting pipeline run");

        let mut cursors = Vec::with_capacity(self.feeds.len());
        for feed in &self.feeds {
            cursors.push(ChangeCursor::restore(*feed, self.store.clone()).await?);
        }

        let state = Mutex::new(RunState {
            cursors,
            handled: HashSet::new(),
            pending: None,
            stats: RunStats::default(),
        });
        let state = &state;

        let result = retry_with_backoff(
            self.backoff.schedule(),
            OrchestratorError::is_transient,
            self.on_retry,
            || self.attempt(state),
        )
        .await;

        let stats = state.lock().await.stats;
        match result {
            Ok(()) => {
                info!(
                    changes_detected = stats.changes_detected,
                    movies_indexed = stats.movies_indexed,
                    movies_skipped = stats.movies_skipped,
                    "Pipeline run complete"
                );
                Ok(stats)
            }
            Err(e) => {
                warn!(
                    changes_detected = stats.changes_detected,
                    movies_indexed = stats.movies_indexed,
                    movies_skipped = stats.movies_skipped,
                    "Pipeline run aborted"
                );
                Err(e)
            }
        }
    }

    /// One attempt at the run body on a fresh connection.
    async fn attempt(&self, state: &Mutex<RunState>) -> Result<(), OrchestratorError> {
        let mut state = state.lock().await;

        let source = self.connector.connect().await?;
        let result = self.drain(source.as_ref(), &mut state).await;
        source.close().await;

        result
    }

    async fn drain(
        &self,
        source: &dyn CatalogSource,
        state: &mut RunState,
    ) -> Result<(), OrchestratorError> {
        let RunState {
            cursors,
            handled,
            pending,
            stats,
        } = state;

        // The checkpoint already moved past a change that was interrupted.
        if let Some(change) = pending.clone() {
            debug!(entity_id = %change.entity_id, "Resuming interrupted change");
            self.process_change(source, &change, handled, stats).await?;
            *pending = None;
        }

        for cursor in cursors.iter_mut() {
            debug!(feed = %cursor.feed(), "Polling feed");
            while let Some(change) = cursor.detect_next(source).await? {
                stats.changes_detected += 1;
                *pending = Some(change.clone());
                self.process_change(source, &change, handled, stats).await?;
                *pending = None;
            }
        }

        Ok(())
    }

    /// Rebuild and load every movie affected by `change` not handled yet.
    async fn process_change(
        &self,
        source: &dyn CatalogSource,
        change: &ChangeRecord,
        handled: &mut HashSet<Uuid>,
        stats: &mut RunStats,
    ) -> Result<(), OrchestratorError> {
        let movie_ids = self.resolver.resolve(source, change).await?;

        for movie_id in movie_ids {
            if handled.contains(&movie_id) {
                continue;
            }

            match self.assembler.extract(source, movie_id).await {
                Ok(document) => {
                    self.loader.load_document(document).await?;
                    stats.movies_indexed += 1;
                }
                Err(ProcessorError::MovieNotFound(_)) => {
                    warn!(
                        movie_id = %movie_id,
                        kind = %change.entity_kind,
                        entity_id = %change.entity_id,
                        "Movie vanished before it could be indexed, skipping"
                    );
                    stats.movies_skipped += 1;
                }
                Err(e) => return Err(e.into()),
            }

            handled.insert(movie_id);
        }

        Ok(())
    }
}
