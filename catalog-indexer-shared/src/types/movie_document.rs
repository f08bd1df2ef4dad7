//! Movie document types for the search index.
//!
//! This module defines the denormalized document that is indexed in the
//! search engine for every movie.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person reference embedded in a movie document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: Uuid,
    pub name: String,
}

impl PersonRef {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Document representation of a movie in the search index.
///
/// The document is rebuilt from the source rows on every change and
/// upserted as a whole; it is never patched field by field.
///
/// # Fields
///
/// - `id`: The movie id, also used as the index document id
/// - `imdb_rating`: `None` when the source has no rating
/// - `genre`: Unique genre names joined with single spaces
/// - `director`: Director name, empty when the movie has none
/// - `actors_names` / `writers_names`: Names joined with single spaces
/// - `actors` / `writers`: Unique by id, in the order they were found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDocument {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub imdb_rating: Option<f64>,
    pub genre: String,
    pub director: String,
    pub actors_names: String,
    pub writers_names: String,
    pub actors: Vec<PersonRef>,
    pub writers: Vec<PersonRef>,
}

impl MovieDocument {
    /// Create an empty document for the given movie.
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            title: String::new(),
            description: String::new(),
            imdb_rating: None,
            genre: String::new(),
            director: String::new(),
            actors_names: String::new(),
            writers_names: String::new(),
            actors: Vec::new(),
            writers: Vec::new(),
        }
    }

    /// The document id used in the search index.
    pub fn document_id(&self) -> Uuid {
        self.id
    }
}
