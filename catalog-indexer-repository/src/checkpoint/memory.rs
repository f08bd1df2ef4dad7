use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::errors::CheckpointStoreError;
use crate::interfaces::CheckpointStore;

/// Checkpoint store that keeps its state in memory only.
#[derive(Default)]
pub struct InMemoryCheckpointStore {
    state: Mutex<HashMap<String, String>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            state: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Copy of everything stored so far.
    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.state.lock().await.clone()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn get_state(&self, key: &str) -> Result<Option<String>, CheckpointStoreError> {
        Ok(self.state.lock().await.get(key).cloned())
    }

    async fn set_state(&self, key: &str, value: &str) -> Result<(), CheckpointStoreError> {
        self.state
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_unset_key() {
        let store = InMemoryCheckpointStore::new();
        assert_eq!(store.get_state("movie_offset").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = InMemoryCheckpointStore::with_entries([("movie_offset", "1")]);
        store.set_state("movie_offset", "2").await.unwrap();
        assert_eq!(
            store.get_state("movie_offset").await.unwrap(),
            Some("2".to_string())
        );
    }
}
