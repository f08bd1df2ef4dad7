//! SQL run by the PostgreSQL catalog source.
//!
//! Change queries order by `updated_at` and then by id, so that rows
//! sharing a timestamp keep the same relative order between the detect
//! query and the count query, and between runs.

use catalog_indexer_shared::EntityKind;

use crate::types::ChangeFeed;

const MOVIE_CHANGES: &str = "SELECT id, updated_at, 'movie'::text AS type FROM content.movies";
const GENRE_CHANGES: &str = "SELECT id, updated_at, 'genre'::text AS type FROM content.genres";
const PERSON_CHANGES: &str = "SELECT id, updated_at, 'person'::text AS type FROM content.persons";

/// Rows of a feed as `(id, updated_at, type)`.
fn feed_rows(feed: ChangeFeed) -> String {
    match feed {
        ChangeFeed::Kind(EntityKind::Movie) => MOVIE_CHANGES.to_string(),
        ChangeFeed::Kind(EntityKind::Genre) => GENRE_CHANGES.to_string(),
        ChangeFeed::Kind(EntityKind::Person) => PERSON_CHANGES.to_string(),
        ChangeFeed::Unified => format!(
            "{} UNION ALL {} UNION ALL {}",
            MOVIE_CHANGES, GENRE_CHANGES, PERSON_CHANGES
        ),
    }
}

/// Window of changes after `$1` (watermark), skipping `$2` rows.
fn window(feed: ChangeFeed) -> String {
    format!(
        "SELECT id, updated_at, type FROM ({}) AS changes \
         WHERE updated_at > $1 \
         ORDER BY updated_at, type, id \
         OFFSET $2",
        feed_rows(feed)
    )
}

/// First change of the window. Binds `$1` watermark, `$2` offset.
pub(crate) fn changed_since(feed: ChangeFeed) -> String {
    format!("{} LIMIT 1", window(feed))
}

/// Number of changes left in the window, capped at two. Binds `$1`
/// watermark, `$2` offset.
pub(crate) fn count_changed_since(feed: ChangeFeed) -> String {
    format!(
        "SELECT COUNT(*) FROM ({} LIMIT 2) AS remaining",
        window(feed)
    )
}

/// Movies linked to genre `$1`.
pub(crate) const MOVIES_FOR_GENRE: &str = "SELECT DISTINCT m.id \
     FROM content.movies m \
     JOIN content.genres_movies gm ON gm.movie_id = m.id \
     WHERE gm.genre_id = $1";

/// Movies person `$1` took part in, whatever the role.
pub(crate) const MOVIES_FOR_PERSON: &str = "SELECT DISTINCT m.id \
     FROM content.movies m \
     JOIN content.persons_movies pm ON pm.movie_id = m.id \
     WHERE pm.person_id = $1";

/// One row per (person, genre) of movie `$1`.
pub(crate) const MOVIE_ROWS: &str = "SELECT \
         m.id AS movie_id, \
         m.title, \
         m.plot AS description, \
         m.imdb_rating::float8 AS imdb_rating, \
         pm.part AS role, \
         p.id AS person_id, \
         p.name AS person_name, \
         g.id AS genre_id, \
         g.name AS genre_name \
     FROM content.movies m \
     LEFT JOIN content.persons_movies pm ON pm.movie_id = m.id \
     LEFT JOIN content.persons p ON p.id = pm.person_id \
     LEFT JOIN content.genres_movies gm ON gm.movie_id = m.id \
     LEFT JOIN content.genres g ON g.id = gm.genre_id \
     WHERE m.id = $1";
