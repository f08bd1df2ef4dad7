//! Interface definitions for the external collaborators of the pipeline.
//!
//! The relational source, the checkpoint store and the search index are
//! only reached through these traits, which allows swapping the backends
//! and testing the pipeline against in-memory implementations.

mod bulk_index_provider;
mod catalog_source;
mod checkpoint_store;

pub use bulk_index_provider::BulkIndexProvider;
pub use catalog_source::{CatalogConnector, CatalogSource};
pub use checkpoint_store::CheckpointStore;
