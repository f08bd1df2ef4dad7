//! Elasticsearch bulk provider implementation.
//!
//! This module provides the concrete implementation of `BulkIndexProvider`
//! using the OpenSearch Rust client's transport against an Elasticsearch
//! compatible `_bulk` endpoint.

use async_trait::async_trait;
use opensearch::{
    http::{
        headers::{HeaderMap, HeaderValue, CONTENT_TYPE},
        transport::{SingleNodeConnectionPool, TransportBuilder},
        Method,
    },
    indices::{IndicesCreateParts, IndicesExistsParts},
    OpenSearch,
};
use tracing::{debug, error, info};
use url::Url;

use crate::elastic::index_config::{get_index_settings, IndexConfig};
use crate::errors::SearchIndexError;
use crate::interfaces::BulkIndexProvider;

/// Path of the bulk-ingest endpoint, relative to the base URL.
const BULK_PATH: &str = "/_bulk";

/// Content type the bulk endpoint expects.
const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Elasticsearch bulk provider.
///
/// # Example
///
/// ```ignore
/// use catalog_indexer_repository::elastic::{ElasticBulkProvider, IndexConfig};
/// let provider = ElasticBulkProvider::new("http://localhost:9200", IndexConfig::default())?;
/// provider.ensure_index_exists().await?;
/// provider.post_bulk(payload).await?;
/// ```
pub struct ElasticBulkProvider {
    client: OpenSearch,
    index_config: IndexConfig,
}

impl ElasticBulkProvider {
    /// Create a new provider for the specified base URL.
    ///
    /// No request is sent yet; connection failures surface on first use.
    ///
    /// # Arguments
    ///
    /// * `url` - The index base URL (e.g., "http://localhost:9200")
    /// * `index_config` - The index configuration
    ///
    /// # Returns
    ///
    /// * `Ok(ElasticBulkProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If the URL is invalid or the transport cannot be built
    pub fn new(url: &str, index_config: IndexConfig) -> Result<Self, SearchIndexError> {
        let parsed_url = Url::parse(url).map_err(|e| SearchIndexError::config(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::config(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            index = %index_config.name,
            "Created Elasticsearch bulk provider"
        );

        Ok(Self {
            client,
            index_config,
        })
    }

    fn bulk_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(NDJSON_CONTENT_TYPE));
        headers
    }
}

#[async_trait]
impl BulkIndexProvider for ElasticBulkProvider {
    fn index_name(&self) -> &str {
        &self.index_config.name
    }

    /// Create the movie index with its mappings unless it already exists.
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError> {
        let index = self.index_config.name.as_str();

        let exists = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if exists.status_code().is_success() {
            debug!(index = %index, "Index already exists");
            return Ok(());
        }

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(get_index_settings())
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index creation failed");
            return Err(SearchIndexError::index_creation(format!(
                "Creating index {} failed with status {}: {}",
                index, status, error_body
            )));
        }

        info!(index = %index, "Created index");
        Ok(())
    }

    /// Send one bulk request.
    ///
    /// Transport failures map to `ConnectionError`. A non-success status
    /// maps to `BulkIndexError`; the body of a successful response is not
    /// inspected for per-item failures.
    async fn post_bulk(&self, payload: String) -> Result<(), SearchIndexError> {
        let bytes = payload.len();

        let response = self
            .client
            .send(
                Method::Post,
                BULK_PATH,
                Self::bulk_headers(),
                Option::<&()>::None,
                Some(payload),
                None,
            )
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchIndexError::bulk_index(status.as_u16(), error_body));
        }

        debug!(bytes = bytes, status = %status, "Bulk request accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_headers_use_ndjson() {
        let headers = ElasticBulkProvider::bulk_headers();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/x-ndjson");
    }

    #[test]
    fn test_invalid_url_is_a_config_error() {
        let result = ElasticBulkProvider::new("not a url", IndexConfig::default());
        assert!(matches!(result, Err(SearchIndexError::ConfigError(_))));
    }

    #[test]
    fn test_index_name_comes_from_config() {
        let provider =
            ElasticBulkProvider::new("http://localhost:9200", IndexConfig::new("movies_v2"))
                .unwrap();
        assert_eq!(provider.index_name(), "movies_v2");
    }
}
