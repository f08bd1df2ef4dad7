//! Bulk index provider trait definition.
//!
//! This module defines the abstract interface to the search index's bulk
//! ingest endpoint, allowing different backends (Elasticsearch, OpenSearch)
//! and mock implementations in tests.

use async_trait::async_trait;

use crate::errors::SearchIndexError;

/// Abstracts the bulk-ingest endpoint of the search index.
///
/// The provider only moves bytes: encoding documents into the bulk wire
/// format happens before `post_bulk` is called (see [`crate::bulk`]).
///
/// # Index Initialization
///
/// Implementations should call `ensure_index_exists` during application
/// startup so that the first bulk request does not create the index with
/// dynamic mappings.
#[async_trait]
pub trait BulkIndexProvider: Send + Sync {
    /// Name of the index the provider writes to.
    fn index_name(&self) -> &str;

    /// Ensure the search index exists, creating it with its mappings if necessary.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index is ready for use
    /// * `Err(SearchIndexError)` - If initialization fails
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError>;

    /// Send an encoded bulk payload in a single request.
    ///
    /// # Arguments
    ///
    /// * `payload` - Newline-delimited action/document pairs, newline terminated
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index accepted the request
    /// * `Err(SearchIndexError::ConnectionError)` - If no response was received
    /// * `Err(SearchIndexError)` - If the index rejected the request
    async fn post_bulk(&self, payload: String) -> Result<(), SearchIndexError>;
}
