//! This module defines the `CatalogSource` trait, the read-only view of the
//! relational catalog the pipeline extracts changes and movies from.
use async_trait::async_trait;
use catalog_indexer_shared::{ChangeRecord, MovieRow};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::SourceError;
use crate::types::ChangeFeed;

/// A trait that defines the queries the pipeline runs against the catalog.
///
/// Implementors hold a single connection for the duration of a run. All
/// methods take `&self` and are awaited one at a time by the pipeline; the
/// source is never queried concurrently.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Returns the first change of `feed` with `updated_at > since`, in
    /// ascending `updated_at` order, after skipping `offset` changes.
    ///
    /// # Arguments
    ///
    /// * `feed` - The change feed to read
    /// * `since` - The watermark; only strictly newer changes qualify
    /// * `offset` - Number of qualifying changes to skip
    ///
    /// # Returns
    ///
    /// * `Ok(Some(ChangeRecord))` - The next change in the window
    /// * `Ok(None)` - No change is left in the window
    /// * `Err(SourceError)` - If the query fails
    async fn changed_since(
        &self,
        feed: ChangeFeed,
        since: DateTime<Utc>,
        offset: i64,
    ) -> Result<Option<ChangeRecord>, SourceError>;

    /// Counts the changes `changed_since` could still return for the same
    /// window, the first one included.
    ///
    /// Implementations may stop counting at two: callers only need to know
    /// whether more than one change is left.
    async fn count_changed_since(
        &self,
        feed: ChangeFeed,
        since: DateTime<Utc>,
        offset: i64,
    ) -> Result<i64, SourceError>;

    /// Returns the ids of the movies linked to a genre, possibly none.
    async fn movies_for_genre(&self, genre_id: Uuid) -> Result<Vec<Uuid>, SourceError>;

    /// Returns the ids of the movies a person took part in, possibly none.
    async fn movies_for_person(&self, person_id: Uuid) -> Result<Vec<Uuid>, SourceError>;

    /// Returns one row per (person, genre) combination of a movie.
    ///
    /// A movie without persons or genres still yields a single row with
    /// the relation columns empty; an unknown movie yields no rows.
    async fn movie_rows(&self, movie_id: Uuid) -> Result<Vec<MovieRow>, SourceError>;

    /// Releases the underlying connection.
    async fn close(&self);
}

/// Opens connections to the catalog.
///
/// The pipeline opens one connection per run attempt and reconnects through
/// this trait after a transient failure.
#[async_trait]
pub trait CatalogConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn CatalogSource>, SourceError>;
}
