//! Loader module for the catalog indexer pipeline.
//!
//! Encodes movie documents into bulk payloads and sends them to the search
//! index, waiting out lost connections.

use std::sync::Arc;
use std::time::Duration;

use catalog_indexer_repository::{
    encode_bulk, BulkDirective, BulkIndexProvider, SearchIndexError,
};
use catalog_indexer_shared::MovieDocument;
use tracing::{debug, error, instrument};
use uuid::Uuid;

use crate::errors::LoaderError;
use crate::retry::{log_backoff, retry_with_backoff, BackoffPolicy};

/// Loader that indexes movie documents into the search engine.
///
/// Each call to `load` sends exactly one bulk request. Connection failures
/// are retried with exponential backoff for as long as it takes; any
/// response from the index, including an error status, ends the call.
pub struct BulkLoader {
    provider: Arc<dyn BulkIndexProvider>,
    backoff: BackoffPolicy,
    on_retry: fn(usize, Duration, &SearchIndexError),
}

impl BulkLoader {
    /// Create a new loader with the default backoff policy.
    pub fn new(provider: Arc<dyn BulkIndexProvider>) -> Self {
        Self::with_backoff(provider, BackoffPolicy::default())
    }

    /// Create a new loader with a custom backoff policy.
    pub fn with_backoff(provider: Arc<dyn BulkIndexProvider>, backoff: BackoffPolicy) -> Self {
        Self {
            provider,
            backoff,
            on_retry: log_backoff,
        }
    }

    /// Replace the observer called before every backoff wait.
    pub fn on_retry(mut self, observer: fn(usize, Duration, &SearchIndexError)) -> Self {
        self.on_retry = observer;
        self
    }

    /// Pair every document with an `index` action targeting its own id.
    pub fn directives(
        &self,
        documents: Vec<MovieDocument>,
    ) -> Vec<(BulkDirective<Uuid>, MovieDocument)> {
        let index_name = self.provider.index_name();
        documents
            .into_iter()
            .map(|doc| (BulkDirective::index(index_name, doc.document_id()), doc))
            .collect()
    }

    /// Load a batch of documents in a single bulk request.
    ///
    /// An empty batch sends nothing.
    #[instrument(skip(self, items), fields(document_count = items.len()))]
    pub async fn load(
        &self,
        items: &[(BulkDirective<Uuid>, MovieDocument)],
    ) -> Result<(), LoaderError> {
        if items.is_empty() {
            debug!("No documents to load");
            return Ok(());
        }

        let payload = encode_bulk(items)?;

        retry_with_backoff(
            self.backoff.schedule(),
            SearchIndexError::is_connection,
            self.on_retry,
            || self.provider.post_bulk(payload.clone()),
        )
        .await
        .map_err(|e| {
            error!(error = %e, count = items.len(), "Bulk load failed");
            LoaderError::from(e)
        })?;

        debug!(count = items.len(), "Loaded documents");
        Ok(())
    }

    /// Load a single movie document.
    pub async fn load_document(&self, document: MovieDocument) -> Result<(), LoaderError> {
        let items = self.directives(vec![document]);
        self.load(&items).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Mock bulk provider failing to connect a fixed number of times.
    struct MockBulkProvider {
        connection_failures: AtomicUsize,
        status_error: Option<u16>,
        calls: AtomicUsize,
        payloads: Mutex<Vec<String>>,
    }

    impl MockBulkProvider {
        fn new() -> Self {
            Self::failing(0)
        }

        fn failing(connection_failures: usize) -> Self {
            Self {
                connection_failures: AtomicUsize::new(connection_failures),
                status_error: None,
                calls: AtomicUsize::new(0),
                payloads: Mutex::new(Vec::new()),
            }
        }

        fn rejecting(status: u16) -> Self {
            Self {
                status_error: Some(status),
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl BulkIndexProvider for MockBulkProvider {
        fn index_name(&self) -> &str {
            "movies"
        }

        async fn ensure_index_exists(&self) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn post_bulk(&self, payload: String) -> Result<(), SearchIndexError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let left = self.connection_failures.load(Ordering::SeqCst);
            if left > 0 {
                self.connection_failures.store(left - 1, Ordering::SeqCst);
                return Err(SearchIndexError::connection("connection refused"));
            }
            if let Some(status) = self.status_error {
                return Err(SearchIndexError::bulk_index(status, "rejected"));
            }

            self.payloads.lock().unwrap().push(payload);
            Ok(())
        }
    }

    static WAITS: AtomicUsize = AtomicUsize::new(0);

    fn count_wait(_tries: usize, _wait: Duration, _err: &SearchIndexError) {
        WAITS.fetch_add(1, Ordering::SeqCst);
    }

    fn movie(title: &str) -> MovieDocument {
        let mut doc = MovieDocument::new(Uuid::new_v4());
        doc.title = title.to_string();
        doc
    }

    #[tokio::test]
    async fn test_load_sends_one_request_for_the_batch() {
        let provider = Arc::new(MockBulkProvider::new());
        let loader = BulkLoader::new(provider.clone());

        let items = loader.directives(vec![movie("A"), movie("B")]);
        loader.load(&items).await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        let payloads = provider.payloads.lock().unwrap();
        assert_eq!(payloads[0].lines().count(), 4);
        assert!(payloads[0].starts_with(&format!(
            "{{\"index\":{{\"_index\":\"movies\",\"_id\":\"{}\"}}}}\n",
            items[0].0.id()
        )));
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_no_op() {
        let provider = Arc::new(MockBulkProvider::new());
        let loader = BulkLoader::new(provider.clone());

        loader.load(&[]).await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connection_failures_are_retried() {
        let provider = Arc::new(MockBulkProvider::failing(2));
        let loader = BulkLoader::new(provider.clone()).on_retry(count_wait);

        loader.load_document(movie("A")).await.unwrap();

        assert_eq!(WAITS.load(Ordering::SeqCst), 2);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
        assert_eq!(provider.payloads.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_status_is_not_retried() {
        let provider = Arc::new(MockBulkProvider::rejecting(400));
        let loader = BulkLoader::new(provider.clone());

        let result = loader.load_document(movie("A")).await;

        assert!(matches!(
            result,
            Err(LoaderError::SearchIndexError(
                SearchIndexError::BulkIndexError { status: 400, .. }
            ))
        ));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
