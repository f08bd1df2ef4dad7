//! Joined source rows for a single movie.

use std::convert::TryFrom;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// One row of the movie extraction query.
///
/// The query outer-joins persons and genres onto the movie, so a movie
/// yields one row per (person, genre) combination and at least one row
/// even without any relations. Every column except `movie_id` may be null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieRow {
    pub movie_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub imdb_rating: Option<f64>,
    pub role: Option<String>,
    pub person_id: Option<Uuid>,
    pub person_name: Option<String>,
    pub genre_id: Option<Uuid>,
    pub genre_name: Option<String>,
}

impl MovieRow {
    /// A row carrying only the movie-level columns.
    pub fn movie(movie_id: Uuid, title: impl Into<String>) -> Self {
        Self {
            movie_id,
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_genre(mut self, genre_id: Uuid, name: impl Into<String>) -> Self {
        self.genre_id = Some(genre_id);
        self.genre_name = Some(name.into());
        self
    }

    pub fn with_person(
        mut self,
        role: impl Into<String>,
        person_id: Uuid,
        name: impl Into<String>,
    ) -> Self {
        self.role = Some(role.into());
        self.person_id = Some(person_id);
        self.person_name = Some(name.into());
        self
    }
}

/// Role a person plays in a movie, stored as a one-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PersonRole {
    Actor,
    Writer,
    Director,
}

/// A role code outside `a`, `w` and `d`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown person role code: {0:?}")]
pub struct UnknownRoleCode(pub String);

impl TryFrom<&str> for PersonRole {
    type Error = UnknownRoleCode;

    fn try_from(code: &str) -> Result<Self, Self::Error> {
        match code {
            "a" => Ok(PersonRole::Actor),
            "w" => Ok(PersonRole::Writer),
            "d" => Ok(PersonRole::Director),
            other => Err(UnknownRoleCode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_codes() {
        assert_eq!(PersonRole::try_from("a"), Ok(PersonRole::Actor));
        assert_eq!(PersonRole::try_from("w"), Ok(PersonRole::Writer));
        assert_eq!(PersonRole::try_from("d"), Ok(PersonRole::Director));
    }

    #[test]
    fn test_unknown_role_code() {
        assert_eq!(
            PersonRole::try_from("p"),
            Err(UnknownRoleCode("p".to_string()))
        );
        // Codes are case sensitive.
        assert!(PersonRole::try_from("A").is_err());
    }
}
