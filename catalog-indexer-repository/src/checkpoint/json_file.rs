//! JSON file implementation of the checkpoint store.
//!
//! The whole state is one JSON object mapping keys to values. It is loaded
//! once when the store is opened and rewritten in full on every update:
//! the new content goes to a sibling temporary file that is then renamed
//! over the original, so a crash leaves either the old or the new state.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::errors::CheckpointStoreError;
use crate::interfaces::CheckpointStore;

/// File-backed checkpoint store.
pub struct JsonFileCheckpointStore {
    path: PathBuf,
    state: Mutex<BTreeMap<String, Value>>,
}

impl JsonFileCheckpointStore {
    /// Opens the store at `path`.
    ///
    /// A missing file is treated as an empty store; it is created on the
    /// first `set_state`.
    ///
    /// # Returns
    ///
    /// * `Ok(JsonFileCheckpointStore)` - Store holding the file's current content
    /// * `Err(CheckpointStoreError)` - If the file cannot be read or is not a JSON object
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, CheckpointStoreError> {
        let path = path.as_ref().to_path_buf();

        let state = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "No checkpoint file yet, starting empty");
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), keys = state.len(), "Opened checkpoint file");

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn persist(&self, state: &BTreeMap<String, Value>) -> Result<(), CheckpointStoreError> {
        let bytes = serde_json::to_vec_pretty(state)?;
        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, bytes).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CheckpointStore for JsonFileCheckpointStore {
    async fn get_state(&self, key: &str) -> Result<Option<String>, CheckpointStoreError> {
        let state = self.state.lock().await;
        // Values written by other tools may be numbers rather than strings.
        Ok(state.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
    }

    async fn set_state(&self, key: &str, value: &str) -> Result<(), CheckpointStoreError> {
        let mut state = self.state.lock().await;
        state.insert(key.to_string(), Value::String(value.to_string()));
        self.persist(&state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_state_path() -> PathBuf {
        std::env::temp_dir().join(format!("catalog-indexer-state-{}.json", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let path = temp_state_path();
        let store = JsonFileCheckpointStore::open(&path).await.unwrap();

        assert_eq!(store.get_state("genre_offset").await.unwrap(), None);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let path = temp_state_path();
        {
            let store = JsonFileCheckpointStore::open(&path).await.unwrap();
            store.set_state("genre_offset", "3").await.unwrap();
            store
                .set_state("genre_unprocessed_from", "2024-01-01T00:00:00+00:00")
                .await
                .unwrap();
        }

        let reopened = JsonFileCheckpointStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get_state("genre_offset").await.unwrap(),
            Some("3".to_string())
        );
        assert_eq!(
            reopened.get_state("genre_unprocessed_from").await.unwrap(),
            Some("2024-01-01T00:00:00+00:00".to_string())
        );
        assert!(!reopened.temp_path().exists());

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_numeric_values_are_read_as_strings() {
        let path = temp_state_path();
        tokio::fs::write(&path, r#"{"movie_offset": 4}"#).await.unwrap();

        let store = JsonFileCheckpointStore::open(&path).await.unwrap();
        assert_eq!(
            store.get_state("movie_offset").await.unwrap(),
            Some("4".to_string())
        );

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_file_is_empty_store() {
        let path = temp_state_path();
        tokio::fs::write(&path, "").await.unwrap();

        let store = JsonFileCheckpointStore::open(&path).await.unwrap();
        assert_eq!(store.get_state("movie_offset").await.unwrap(), None);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_garbage_file_is_rejected() {
        let path = temp_state_path();
        tokio::fs::write(&path, "not json").await.unwrap();

        let result = JsonFileCheckpointStore::open(&path).await;
        assert!(matches!(result, Err(CheckpointStoreError::Json(_))));

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
