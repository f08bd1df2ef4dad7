//! Document assembler implementation.
//!
//! Denormalizes the outer-joined rows of one movie into a `MovieDocument`.

use std::collections::{BTreeSet, HashSet};

use catalog_indexer_repository::CatalogSource;
use catalog_indexer_shared::{MovieDocument, MovieRow, PersonRef, PersonRole};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::errors::ProcessorError;

/// Actors or writers of a movie, unique by id in the order they were found.
#[derive(Default)]
struct People {
    seen: HashSet<Uuid>,
    refs: Vec<PersonRef>,
}

impl People {
    fn add(&mut self, id: Uuid, name: &str) {
        if self.seen.insert(id) {
            self.refs.push(PersonRef::new(id, name));
        }
    }

    fn names(&self) -> String {
        self.refs
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Builds movie documents from source rows.
///
/// The extraction query yields one row per (person, genre) pair, so every
/// movie-level column and every relation is repeated across rows. The
/// assembler collapses the repetition:
///
/// - `title`, `description`, `imdb_rating`: first non-empty value
/// - `genre`: distinct names, sorted, joined with single spaces
/// - `director`: the last person with role `d`
/// - `actors` / `writers`: distinct by person id, in row order
///
/// The same rows always produce the same document.
#[derive(Debug, Default)]
pub struct DocumentAssembler;

impl DocumentAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Fetches the rows of `movie_id` and assembles its document.
    ///
    /// # Returns
    ///
    /// * `Ok(MovieDocument)` - The rebuilt document
    /// * `Err(ProcessorError::MovieNotFound)` - If the source has no rows for the movie
    /// * `Err(ProcessorError)` - If the query fails or a row carries an unknown role
    #[instrument(skip(self, source), fields(movie_id = %movie_id))]
    pub async fn extract(
        &self,
        source: &dyn CatalogSource,
        movie_id: Uuid,
    ) -> Result<MovieDocument, ProcessorError> {
        let rows = source.movie_rows(movie_id).await?;
        debug!(rows = rows.len(), "Fetched movie rows");
        self.assemble(movie_id, &rows)
    }

    /// Assembles the document of `movie_id` from its joined rows.
    pub fn assemble(
        &self,
        movie_id: Uuid,
        rows: &[MovieRow],
    ) -> Result<MovieDocument, ProcessorError> {
        if rows.is_empty() {
            return Err(ProcessorError::MovieNotFound(movie_id));
        }

        let mut doc = MovieDocument::new(movie_id);
        let mut genres = BTreeSet::new();
        let mut actors = People::default();
        let mut writers = People::default();

        for row in rows {
            if doc.title.is_empty() {
                if let Some(title) = non_empty(&row.title) {
                    doc.title = title.to_string();
                }
            }
            if doc.description.is_empty() {
                if let Some(description) = non_empty(&row.description) {
                    doc.description = description.to_string();
                }
            }
            if doc.imdb_rating.is_none() {
                doc.imdb_rating = row.imdb_rating;
            }

            if let Some(genre) = non_empty(&row.genre_name) {
                genres.insert(genre);
            }

            let Some(code) = row.role.as_deref() else {
                continue;
            };
            let role = PersonRole::try_from(code).map_err(|e| ProcessorError::UnknownRole {
                movie_id,
                person_id: row.person_id,
                code: e.0,
            })?;

            // A role without a person is a dangling link; nothing to add.
            let Some(person_id) = row.person_id else {
                continue;
            };
            let name = row.person_name.as_deref().unwrap_or_default();

            match role {
                PersonRole::Actor => actors.add(person_id, name),
                PersonRole::Writer => writers.add(person_id, name),
                PersonRole::Director => doc.director = name.to_string(),
            }
        }

        doc.genre = genres.into_iter().collect::<Vec<_>>().join(" ");
        doc.actors_names = actors.names();
        doc.writers_names = writers.names();
        doc.actors = actors.refs;
        doc.writers = writers.refs;

        Ok(doc)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble(movie_id: Uuid, rows: &[MovieRow]) -> Result<MovieDocument, ProcessorError> {
        DocumentAssembler::new().assemble(movie_id, rows)
    }

    #[test]
    fn test_movie_without_relations() {
        let id = Uuid::new_v4();
        let mut row = MovieRow::movie(id, "Solaris");
        row.description = Some("A psychologist is sent to a space station.".to_string());
        row.imdb_rating = Some(8.1);

        let doc = assemble(id, &[row]).unwrap();

        assert_eq!(doc.id, id);
        assert_eq!(doc.title, "Solaris");
        assert_eq!(doc.description, "A psychologist is sent to a space station.");
        assert_eq!(doc.imdb_rating, Some(8.1));
        assert!(doc.genre.is_empty());
        assert!(doc.director.is_empty());
        assert!(doc.actors.is_empty());
        assert!(doc.actors_names.is_empty());
    }

    #[test]
    fn test_duplicate_join_rows_collapse() {
        let id = Uuid::new_v4();
        let drama = Uuid::new_v4();
        let rows = vec![
            MovieRow::movie(id, "X").with_genre(drama, "Drama"),
            MovieRow::movie(id, "X").with_genre(drama, "Drama"),
        ];

        let doc = assemble(id, &rows).unwrap();

        assert_eq!(doc.genre, "Drama");
    }

    #[test]
    fn test_genres_are_sorted_and_unique() {
        let id = Uuid::new_v4();
        let rows = vec![
            MovieRow::movie(id, "X").with_genre(Uuid::new_v4(), "Thriller"),
            MovieRow::movie(id, "X").with_genre(Uuid::new_v4(), "Crime"),
            MovieRow::movie(id, "X").with_genre(Uuid::new_v4(), "Thriller"),
        ];

        let doc = assemble(id, &rows).unwrap();

        assert_eq!(doc.genre, "Crime Thriller");
    }

    #[test]
    fn test_first_non_empty_movie_fields_win() {
        let id = Uuid::new_v4();
        let mut first = MovieRow::movie(id, "");
        first.description = None;
        let mut second = MovieRow::movie(id, "Heat");
        second.description = Some("Cops and robbers.".to_string());
        second.imdb_rating = Some(8.3);
        let mut third = MovieRow::movie(id, "Other");
        third.imdb_rating = Some(1.0);

        let doc = assemble(id, &[first, second, third]).unwrap();

        assert_eq!(doc.title, "Heat");
        assert_eq!(doc.description, "Cops and robbers.");
        assert_eq!(doc.imdb_rating, Some(8.3));
    }

    #[test]
    fn test_people_are_split_by_role() {
        let id = Uuid::new_v4();
        let (pacino, de_niro, mann) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let rows = vec![
            MovieRow::movie(id, "Heat").with_person("a", pacino, "Al Pacino"),
            MovieRow::movie(id, "Heat").with_person("a", de_niro, "Robert De Niro"),
            MovieRow::movie(id, "Heat").with_person("w", mann, "Michael Mann"),
            MovieRow::movie(id, "Heat").with_person("d", mann, "Michael Mann"),
            MovieRow::movie(id, "Heat").with_person("a", pacino, "Al Pacino"),
        ];

        let doc = assemble(id, &rows).unwrap();

        assert_eq!(
            doc.actors,
            vec![
                PersonRef::new(pacino, "Al Pacino"),
                PersonRef::new(de_niro, "Robert De Niro"),
            ]
        );
        assert_eq!(doc.actors_names, "Al Pacino Robert De Niro");
        assert_eq!(doc.writers, vec![PersonRef::new(mann, "Michael Mann")]);
        assert_eq!(doc.writers_names, "Michael Mann");
        assert_eq!(doc.director, "Michael Mann");
    }

    #[test]
    fn test_last_director_wins() {
        let id = Uuid::new_v4();
        let rows = vec![
            MovieRow::movie(id, "X").with_person("d", Uuid::new_v4(), "First"),
            MovieRow::movie(id, "X").with_person("d", Uuid::new_v4(), "Second"),
        ];

        let doc = assemble(id, &rows).unwrap();

        assert_eq!(doc.director, "Second");
    }

    #[test]
    fn test_null_role_adds_no_person() {
        let id = Uuid::new_v4();
        let mut row = MovieRow::movie(id, "X");
        row.person_id = Some(Uuid::new_v4());
        row.person_name = Some("Nobody".to_string());

        let doc = assemble(id, &[row]).unwrap();

        assert!(doc.actors.is_empty());
        assert!(doc.writers.is_empty());
        assert!(doc.director.is_empty());
    }

    #[test]
    fn test_unknown_role_is_an_error() {
        let id = Uuid::new_v4();
        let person = Uuid::new_v4();
        let rows = vec![MovieRow::movie(id, "X").with_person("p", person, "Producer")];

        let result = assemble(id, &rows);

        match result {
            Err(ProcessorError::UnknownRole {
                movie_id,
                person_id,
                code,
            }) => {
                assert_eq!(movie_id, id);
                assert_eq!(person_id, Some(person));
                assert_eq!(code, "p");
            }
            other => panic!("expected UnknownRole, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_role_on_dangling_link_is_an_error() {
        let id = Uuid::new_v4();
        let mut row = MovieRow::movie(id, "X");
        row.role = Some("p".to_string());

        match assemble(id, &[row]) {
            Err(ProcessorError::UnknownRole {
                person_id, code, ..
            }) => {
                assert_eq!(person_id, None);
                assert_eq!(code, "p");
            }
            other => panic!("expected UnknownRole, got {:?}", other),
        }
    }

    #[test]
    fn test_known_role_on_dangling_link_adds_no_person() {
        let id = Uuid::new_v4();
        let mut row = MovieRow::movie(id, "X");
        row.role = Some("a".to_string());

        let doc = assemble(id, &[row]).unwrap();

        assert!(doc.actors.is_empty());
        assert!(doc.actors_names.is_empty());
    }

    #[test]
    fn test_no_rows_is_movie_not_found() {
        let id = Uuid::new_v4();
        assert!(matches!(
            assemble(id, &[]),
            Err(ProcessorError::MovieNotFound(missing)) if missing == id
        ));
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let id = Uuid::new_v4();
        let rows = vec![
            MovieRow::movie(id, "X")
                .with_genre(Uuid::new_v4(), "Drama")
                .with_person("a", Uuid::new_v4(), "A"),
            MovieRow::movie(id, "X")
                .with_genre(Uuid::new_v4(), "Comedy")
                .with_person("w", Uuid::new_v4(), "B"),
        ];

        assert_eq!(assemble(id, &rows).unwrap(), assemble(id, &rows).unwrap());
    }
}
