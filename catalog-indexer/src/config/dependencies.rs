//! Dependency initialization and wiring for the catalog indexer.

use std::sync::Arc;

use catalog_indexer_repository::{
    BulkIndexProvider, ElasticBulkProvider, IndexConfig, JsonFileCheckpointStore,
    PostgresConnector, SearchIndexError,
};
use tracing::info;

use crate::config::Settings;
use crate::loader::BulkLoader;
use crate::orchestrator::Pipeline;
use crate::retry::{log_backoff, retry_with_backoff};
use crate::IndexingError;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured pipeline ready to run.
    pub pipeline: Pipeline,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// See [`Settings::from_env`] for the variables read.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If the settings are invalid or initialization fails
    pub async fn new() -> Result<Self, IndexingError> {
        let settings = Settings::from_env()?;
        Self::from_settings(settings).await
    }

    /// Initialize all dependencies from validated settings.
    ///
    /// Waits for the search index to become reachable, then makes sure the
    /// movie index exists. The catalog database is only connected to when
    /// the pipeline runs.
    pub async fn from_settings(settings: Settings) -> Result<Self, IndexingError> {
        info!(
            postgres_host = %settings.postgres.host,
            postgres_port = settings.postgres.port,
            postgres_db = %settings.postgres.database,
            elastic_url = %settings.elastic.url(),
            index = %settings.elastic.index,
            state_file = %settings.state_file.display(),
            cursor_mode = ?settings.cursor_mode,
            "Initializing dependencies"
        );

        let provider = ElasticBulkProvider::new(
            &settings.elastic.url(),
            IndexConfig::new(settings.elastic.index.clone()),
        )
        .map_err(|e| IndexingError::config(format!("Failed to create bulk provider: {}", e)))?;

        // Exits if the index cannot be created
        retry_with_backoff(
            settings.backoff.schedule(),
            SearchIndexError::is_connection,
            log_backoff,
            || provider.ensure_index_exists(),
        )
        .await
        .map_err(|e| IndexingError::config(format!("Failed to ensure index exists: {}", e)))?;

        info!("Search index ready");

        let store = JsonFileCheckpointStore::open(&settings.state_file)
            .await
            .map_err(|e| {
                IndexingError::config(format!(
                    "Failed to open checkpoint file {}: {}",
                    settings.state_file.display(),
                    e
                ))
            })?;

        let connector = PostgresConnector::new(settings.postgres.connect_options());

        let loader = BulkLoader::with_backoff(Arc::new(provider), settings.backoff);

        let pipeline = Pipeline::new(
            Arc::new(connector),
            Arc::new(store),
            settings.cursor_mode.feeds(),
            loader,
        )
        .with_backoff(settings.backoff);

        Ok(Self { pipeline })
    }
}
