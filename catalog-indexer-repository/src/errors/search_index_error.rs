//! Search index error types.
//!
//! This module defines the error type for all search index operations and
//! separates connection-level failures, which are worth retrying, from
//! responses the index actually returned.

use thiserror::Error;

/// Errors from search index operations.
///
/// Used by the `BulkIndexProvider` trait. A `ConnectionError` means the
/// request never got a response; every other variant is final.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// Failed to establish or keep a connection to the search index backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The bulk endpoint answered with a non-success status.
    #[error("Bulk index error: status {status}: {body}")]
    BulkIndexError { status: u16, body: String },

    /// Failed to create the search index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Invalid configuration, such as an unparsable base URL.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SearchIndexError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a bulk index error from a response status and body.
    pub fn bulk_index(status: u16, body: impl Into<String>) -> Self {
        Self::BulkIndexError {
            status,
            body: body.into(),
        }
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Whether the request failed before the index could answer.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::ConnectionError(_))
    }
}
