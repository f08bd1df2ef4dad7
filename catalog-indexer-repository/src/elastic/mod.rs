//! Elasticsearch/OpenSearch implementation of the bulk index provider.
//!
//! This module provides a concrete implementation of `BulkIndexProvider`
//! on top of the OpenSearch client transport, which speaks the same bulk
//! protocol as Elasticsearch.

mod index_config;
mod provider;

pub use index_config::{get_index_settings, IndexConfig, DEFAULT_INDEX_NAME};
pub use provider::ElasticBulkProvider;
