use async_trait::async_trait;

use crate::errors::CheckpointStoreError;

/// Trait for interacting with the checkpoint store.
///
/// A durable string-to-string map that survives process restarts. It holds
/// no logic of its own; the change cursors decide what to store under
/// which key.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if it was never set.
    async fn get_state(&self, key: &str) -> Result<Option<String>, CheckpointStoreError>;

    /// Durably stores `value` under `key`, replacing any previous value.
    async fn set_state(&self, key: &str, value: &str) -> Result<(), CheckpointStoreError>;
}
