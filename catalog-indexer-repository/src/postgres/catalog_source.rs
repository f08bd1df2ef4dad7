//! PostgreSQL catalog source and connector.

use async_trait::async_trait;
use catalog_indexer_shared::{ChangeRecord, EntityKind, MovieRow};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{FromRow, PgPool};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::errors::SourceError;
use crate::interfaces::{CatalogConnector, CatalogSource};
use crate::postgres::queries;
use crate::types::ChangeFeed;

#[derive(Debug, FromRow)]
struct ChangeRow {
    id: Uuid,
    updated_at: DateTime<Utc>,
    #[sqlx(rename = "type")]
    kind: String,
}

impl TryFrom<ChangeRow> for ChangeRecord {
    type Error = SourceError;

    fn try_from(row: ChangeRow) -> Result<Self, Self::Error> {
        let kind: EntityKind = row.kind.parse()?;
        Ok(ChangeRecord::new(kind, row.id, row.updated_at))
    }
}

#[derive(Debug, FromRow)]
struct MovieRowRecord {
    movie_id: Uuid,
    title: Option<String>,
    description: Option<String>,
    imdb_rating: Option<f64>,
    role: Option<String>,
    person_id: Option<Uuid>,
    person_name: Option<String>,
    genre_id: Option<Uuid>,
    genre_name: Option<String>,
}

impl From<MovieRowRecord> for MovieRow {
    fn from(row: MovieRowRecord) -> Self {
        MovieRow {
            movie_id: row.movie_id,
            title: row.title,
            description: row.description,
            imdb_rating: row.imdb_rating,
            role: row.role,
            person_id: row.person_id,
            person_name: row.person_name,
            genre_id: row.genre_id,
            genre_name: row.genre_name,
        }
    }
}

/// Catalog source backed by a single PostgreSQL connection.
pub struct PostgresCatalogSource {
    pool: PgPool,
}

impl PostgresCatalogSource {
    /// Connects to the catalog database.
    ///
    /// The pool is capped at one connection: the pipeline never issues
    /// two queries at once.
    pub async fn connect(options: PgConnectOptions) -> Result<Self, SourceError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    async fn movie_ids(&self, sql: &str, id: Uuid) -> Result<Vec<Uuid>, SourceError> {
        let ids: Vec<(Uuid,)> = sqlx::query_as(sql).bind(id).fetch_all(&self.pool).await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }
}

#[async_trait]
impl CatalogSource for PostgresCatalogSource {
    #[instrument(skip(self), fields(feed = %feed))]
    async fn changed_since(
        &self,
        feed: ChangeFeed,
        since: DateTime<Utc>,
        offset: i64,
    ) -> Result<Option<ChangeRecord>, SourceError> {
        let sql = queries::changed_since(feed);
        let row: Option<ChangeRow> = sqlx::query_as(&sql)
            .bind(since)
            .bind(offset)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ChangeRecord::try_from).transpose()
    }

    #[instrument(skip(self), fields(feed = %feed))]
    async fn count_changed_since(
        &self,
        feed: ChangeFeed,
        since: DateTime<Utc>,
        offset: i64,
    ) -> Result<i64, SourceError> {
        let sql = queries::count_changed_since(feed);
        let (count,): (i64,) = sqlx::query_as(&sql)
            .bind(since)
            .bind(offset)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn movies_for_genre(&self, genre_id: Uuid) -> Result<Vec<Uuid>, SourceError> {
        let ids = self.movie_ids(queries::MOVIES_FOR_GENRE, genre_id).await?;
        debug!(genre_id = %genre_id, movies = ids.len(), "Resolved genre");
        Ok(ids)
    }

    async fn movies_for_person(&self, person_id: Uuid) -> Result<Vec<Uuid>, SourceError> {
        let ids = self.movie_ids(queries::MOVIES_FOR_PERSON, person_id).await?;
        debug!(person_id = %person_id, movies = ids.len(), "Resolved person");
        Ok(ids)
    }

    async fn movie_rows(&self, movie_id: Uuid) -> Result<Vec<MovieRow>, SourceError> {
        let rows: Vec<MovieRowRecord> = sqlx::query_as(queries::MOVIE_ROWS)
            .bind(movie_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(MovieRow::from).collect())
    }

    async fn close(&self) {
        self.pool.close().await;
        debug!("Closed catalog connection");
    }
}

/// Opens [`PostgresCatalogSource`]s from fixed connection options.
pub struct PostgresConnector {
    options: PgConnectOptions,
}

impl PostgresConnector {
    pub fn new(options: PgConnectOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl CatalogConnector for PostgresConnector {
    async fn connect(&self) -> Result<Box<dyn CatalogSource>, SourceError> {
        let source = PostgresCatalogSource::connect(self.options.clone()).await?;
        info!(
            host = %self.options.get_host(),
            port = self.options.get_port(),
            "Connected to catalog database"
        );
        Ok(Box::new(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_change_row_maps_kind() {
        let id = Uuid::new_v4();
        let updated_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let row = ChangeRow {
            id,
            updated_at,
            kind: "person".to_string(),
        };

        let record = ChangeRecord::try_from(row).unwrap();

        assert_eq!(record, ChangeRecord::new(EntityKind::Person, id, updated_at));
    }

    #[test]
    fn test_change_row_with_unknown_kind_is_rejected() {
        let row = ChangeRow {
            id: Uuid::new_v4(),
            updated_at: Utc::now(),
            kind: "studio".to_string(),
        };

        let result = ChangeRecord::try_from(row);

        assert!(matches!(result, Err(SourceError::InvalidEntityKind(_))));
    }

    #[test]
    fn test_movie_row_record_keeps_nulls() {
        let movie_id = Uuid::new_v4();
        let record = MovieRowRecord {
            movie_id,
            title: Some("Heat".to_string()),
            description: None,
            imdb_rating: Some(8.3),
            role: None,
            person_id: None,
            person_name: None,
            genre_id: None,
            genre_name: None,
        };

        let row = MovieRow::from(record);

        assert_eq!(row.movie_id, movie_id);
        assert_eq!(row.title.as_deref(), Some("Heat"));
        assert_eq!(row.imdb_rating, Some(8.3));
        assert!(row.role.is_none());
        assert!(row.genre_id.is_none());
    }
}
