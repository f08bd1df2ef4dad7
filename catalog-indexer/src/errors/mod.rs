//! Error types for the catalog indexer pipeline.

use catalog_indexer_repository::{CheckpointStoreError, SearchIndexError, SourceError};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while detecting changes.
#[derive(Error, Debug)]
pub enum CursorError {
    /// The change or count query failed.
    #[error("Source error: {0}")]
    SourceError(#[from] SourceError),

    /// The checkpoint could not be read or written.
    #[error("Checkpoint error: {0}")]
    CheckpointError(#[from] CheckpointStoreError),
}

impl CursorError {
    pub fn is_transient(&self) -> bool {
        match self {
            CursorError::SourceError(e) => e.is_transient(),
            CursorError::CheckpointError(_) => false,
        }
    }
}

/// Errors raised while turning source rows into a movie document.
#[derive(Error, Debug)]
pub enum ProcessorError {
    /// A person is linked to the movie with a role code outside `a`, `w`, `d`.
    /// `person_id` is `None` when the link points at a missing person.
    #[error("Unknown role {code:?} for person {person_id:?} in movie {movie_id}")]
    UnknownRole {
        movie_id: Uuid,
        person_id: Option<Uuid>,
        code: String,
    },

    /// The movie no longer exists in the source.
    #[error("Movie not found: {0}")]
    MovieNotFound(Uuid),

    /// The extraction query failed.
    #[error("Source error: {0}")]
    SourceError(#[from] SourceError),
}

impl ProcessorError {
    pub fn is_transient(&self) -> bool {
        match self {
            ProcessorError::SourceError(e) => e.is_transient(),
            ProcessorError::UnknownRole { .. } | ProcessorError::MovieNotFound(_) => false,
        }
    }
}

/// Errors raised while loading documents into the search index.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// A document could not be encoded into the bulk payload.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The search index rejected the request, or connecting failed for good.
    #[error("Search index error: {0}")]
    SearchIndexError(#[from] SearchIndexError),
}

/// Errors that end a pipeline run.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Connecting to or querying the source failed.
    #[error("Source error: {0}")]
    SourceError(#[from] SourceError),

    #[error("Cursor error: {0}")]
    CursorError(#[from] CursorError),

    #[error("Processor error: {0}")]
    ProcessorError(#[from] ProcessorError),

    #[error("Loader error: {0}")]
    LoaderError(#[from] LoaderError),
}

impl OrchestratorError {
    /// Whether restarting the run after a wait may succeed.
    ///
    /// Only lost source connections qualify. Loader connection failures
    /// are retried inside the loader and never reach this point.
    pub fn is_transient(&self) -> bool {
        match self {
            OrchestratorError::SourceError(e) => e.is_transient(),
            OrchestratorError::CursorError(e) => e.is_transient(),
            OrchestratorError::ProcessorError(e) => e.is_transient(),
            OrchestratorError::LoaderError(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn lost_connection() -> SourceError {
        SourceError::from(sqlx::Error::Io(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "connection reset",
        )))
    }

    #[test]
    fn test_lost_connection_is_transient_at_every_layer() {
        assert!(OrchestratorError::from(lost_connection()).is_transient());
        assert!(OrchestratorError::from(CursorError::from(lost_connection())).is_transient());
        assert!(OrchestratorError::from(ProcessorError::from(lost_connection())).is_transient());
    }

    #[test]
    fn test_integrity_errors_are_not_transient() {
        let unknown_role = ProcessorError::UnknownRole {
            movie_id: Uuid::new_v4(),
            person_id: Some(Uuid::new_v4()),
            code: "x".to_string(),
        };
        assert!(!OrchestratorError::from(unknown_role).is_transient());

        let rejected = LoaderError::from(SearchIndexError::bulk_index(400, "mapper_parsing_exception"));
        assert!(!OrchestratorError::from(rejected).is_transient());

        let checkpoint = CursorError::from(CheckpointStoreError::from(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "read-only file system",
        )));
        assert!(!checkpoint.is_transient());
    }
}
