//! PostgreSQL implementation of the catalog source.
//!
//! Reads the `content` schema: `movies`, `genres`, `persons` and the
//! `genres_movies` / `persons_movies` link tables.

mod catalog_source;
mod queries;

pub use catalog_source::{PostgresCatalogSource, PostgresConnector};
