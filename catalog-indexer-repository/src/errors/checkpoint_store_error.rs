use thiserror::Error;

/// Represents errors that can occur within a checkpoint store.
#[derive(Debug, Error)]
pub enum CheckpointStoreError {
    #[error("Checkpoint file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Checkpoint file is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),
}
