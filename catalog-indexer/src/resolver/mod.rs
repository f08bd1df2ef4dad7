//! Resolves a changed entity to the movies whose documents it appears in.

use catalog_indexer_repository::{CatalogSource, SourceError};
use catalog_indexer_shared::{ChangeRecord, EntityKind};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Maps changes to affected movie ids.
#[derive(Debug, Default)]
pub struct RelationResolver;

impl RelationResolver {
    pub fn new() -> Self {
        Self
    }

    /// Returns the ids of the movies affected by `change`.
    ///
    /// A movie affects only itself and needs no query. Genres and persons
    /// are looked up through their link tables; an entity linked to no
    /// movie yields an empty list.
    #[instrument(skip(self, source, change), fields(kind = %change.entity_kind, entity_id = %change.entity_id))]
    pub async fn resolve(
        &self,
        source: &dyn CatalogSource,
        change: &ChangeRecord,
    ) -> Result<Vec<Uuid>, SourceError> {
        let movie_ids = match change.entity_kind {
            EntityKind::Movie => vec![change.entity_id],
            EntityKind::Genre => source.movies_for_genre(change.entity_id).await?,
            EntityKind::Person => source.movies_for_person(change.entity_id).await?,
        };

        debug!(movies = movie_ids.len(), "Resolved affected movies");
        Ok(movie_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use catalog_indexer_repository::ChangeFeed;
    use catalog_indexer_shared::MovieRow;
    use chrono::{DateTime, Utc};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct LinkSource {
        genres: HashMap<Uuid, Vec<Uuid>>,
        persons: HashMap<Uuid, Vec<Uuid>>,
        queries: AtomicUsize,
    }

    #[async_trait]
    impl CatalogSource for LinkSource {
        async fn changed_since(
            &self,
            _feed: ChangeFeed,
            _since: DateTime<Utc>,
            _offset: i64,
        ) -> Result<Option<ChangeRecord>, SourceError> {
            Ok(None)
        }

        async fn count_changed_since(
            &self,
            _feed: ChangeFeed,
            _since: DateTime<Utc>,
            _offset: i64,
        ) -> Result<i64, SourceError> {
            Ok(0)
        }

        async fn movies_for_genre(&self, genre_id: Uuid) -> Result<Vec<Uuid>, SourceError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            Ok(self.genres.get(&genre_id).cloned().unwrap_or_default())
        }

        async fn movies_for_person(&self, person_id: Uuid) -> Result<Vec<Uuid>, SourceError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            Ok(self.persons.get(&person_id).cloned().unwrap_or_default())
        }

        async fn movie_rows(&self, _movie_id: Uuid) -> Result<Vec<MovieRow>, SourceError> {
            Ok(Vec::new())
        }

        async fn close(&self) {}
    }

    fn change(kind: EntityKind, id: Uuid) -> ChangeRecord {
        ChangeRecord::new(kind, id, Utc::now())
    }

    #[tokio::test]
    async fn test_movie_resolves_to_itself_without_query() {
        let source = LinkSource::default();
        let movie_id = Uuid::new_v4();

        let ids = RelationResolver::new()
            .resolve(&source, &change(EntityKind::Movie, movie_id))
            .await
            .unwrap();

        assert_eq!(ids, vec![movie_id]);
        assert_eq!(source.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_genre_and_person_go_through_links() {
        let genre_id = Uuid::new_v4();
        let person_id = Uuid::new_v4();
        let movies = vec![Uuid::new_v4(), Uuid::new_v4()];
        let mut source = LinkSource::default();
        source.genres.insert(genre_id, movies.clone());
        source.persons.insert(person_id, vec![movies[1]]);

        let resolver = RelationResolver::new();

        let by_genre = resolver
            .resolve(&source, &change(EntityKind::Genre, genre_id))
            .await
            .unwrap();
        let by_person = resolver
            .resolve(&source, &change(EntityKind::Person, person_id))
            .await
            .unwrap();

        assert_eq!(by_genre, movies);
        assert_eq!(by_person, vec![movies[1]]);
    }

    #[tokio::test]
    async fn test_unlinked_entity_resolves_to_nothing() {
        let source = LinkSource::default();

        let ids = RelationResolver::new()
            .resolve(&source, &change(EntityKind::Person, Uuid::new_v4()))
            .await
            .unwrap();

        assert!(ids.is_empty());
    }
}
