//! # Catalog Indexer Shared
//!
//! This crate defines shared data structures used across the catalog indexer.
//! It includes the change records produced by the change cursors, the
//! checkpoint position they persist, the joined source rows and the movie
//! document that ends up in the search index.

pub mod types;

pub use types::change::{ChangeRecord, EntityKind, UnknownEntityKind};
pub use types::checkpoint::Checkpoint;
pub use types::movie_document::{MovieDocument, PersonRef};
pub use types::movie_row::{MovieRow, PersonRole, UnknownRoleCode};
