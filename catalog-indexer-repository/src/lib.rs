//! # Catalog Indexer Repository
//!
//! This crate provides traits and implementations for the collaborators of
//! the catalog indexer: the relational catalog the changes are read from,
//! the store the change cursors persist their checkpoints in, and the
//! search index the movie documents are bulk loaded into. It includes
//! definitions for errors, interfaces, the bulk wire format, and concrete
//! implementations for PostgreSQL, a JSON file and Elasticsearch.

pub mod bulk;
pub mod checkpoint;
pub mod elastic;
pub mod errors;
pub mod interfaces;
pub mod postgres;
pub mod types;

pub use bulk::{encode_bulk, BulkDirective};
pub use checkpoint::{InMemoryCheckpointStore, JsonFileCheckpointStore};
pub use elastic::{ElasticBulkProvider, IndexConfig};
pub use errors::{CheckpointStoreError, SearchIndexError, SourceError};
pub use interfaces::{BulkIndexProvider, CatalogConnector, CatalogSource, CheckpointStore};
pub use postgres::{PostgresCatalogSource, PostgresConnector};
pub use types::ChangeFeed;
