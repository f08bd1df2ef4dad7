//! Error types for the catalog source.
//! Separates connectivity failures, which the pipeline retries, from
//! everything else.
use catalog_indexer_shared::UnknownEntityKind;
use thiserror::Error;

/// SQLSTATE codes signalling the server went away rather than rejected the query.
const SHUTDOWN_SQLSTATES: [&str; 3] = ["57P01", "57P02", "57P03"];

/// Represents errors that can occur while reading the catalog source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Invalid change row: {0}")]
    InvalidEntityKind(#[from] UnknownEntityKind),
}

impl SourceError {
    /// Whether the error comes from losing the connection to the source.
    ///
    /// Covers I/O and TLS failures, pool exhaustion or shutdown, protocol
    /// desynchronisation, connection exceptions (SQLSTATE class `08`) and
    /// administrator or crash shutdowns (`57P01`..`57P03`).
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::DatabaseError(err) => is_transient_sqlx(err),
            SourceError::InvalidEntityKind(_) => false,
        }
    }
}

fn is_transient_sqlx(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db_err) => db_err
            .code()
            .map(|code| {
                let code: &str = &code;
                code.starts_with("08") || SHUTDOWN_SQLSTATES.contains(&code)
            })
            .unwrap_or(false),
        _ => false,
    }
}
