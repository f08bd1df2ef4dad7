//! # Catalog Indexer
//!
//! Catalog indexer for the movie catalog - detects changed movies, genres
//! and persons in PostgreSQL and indexes denormalized movie documents into
//! Elasticsearch.
//!
//! ## Architecture
//!
//! The indexer follows the Cursor-Resolver-Processor-Loader pattern:
//!
//! 1. **Cursor**: Detects changed rows since a persisted checkpoint
//! 2. **Resolver**: Maps a changed entity to the movies it appears in
//! 3. **Processor**: Rebuilds the document of an affected movie
//! 4. **Loader**: Bulk indexes documents into the search index
//! 5. **Orchestrator**: Drives a run over all feeds
//!
//! ## Modules
//!
//! - [`config`]: Settings and dependency initialization
//! - [`cursor`]: Change cursors and checkpoint handling
//! - [`resolver`]: Changed entity to movie ids
//! - [`processor`]: Movie rows to search documents
//! - [`loader`]: Bulk loading with backoff
//! - [`orchestrator`]: Coordinates a pipeline run
//! - [`retry`]: Exponential backoff wrapper
//! - [`errors`]: Error types for the pipeline

pub mod config;
pub mod cursor;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod resolver;
pub mod retry;

pub use config::{Dependencies, Settings};
pub use errors::OrchestratorError;
pub use orchestrator::{Pipeline, RunStats};

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    OrchestratorError(#[from] OrchestratorError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
