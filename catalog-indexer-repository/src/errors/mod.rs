//! Error types for the catalog indexer repository.
//!
//! One error type per external collaborator: the relational source, the
//! checkpoint store and the search index.

mod checkpoint_store_error;
mod search_index_error;
mod source_error;

pub use checkpoint_store_error::CheckpointStoreError;
pub use search_index_error::SearchIndexError;
pub use source_error::SourceError;
