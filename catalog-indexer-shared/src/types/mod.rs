//! This module defines the core data structures used across the catalog indexer.

pub mod change;
pub mod checkpoint;
pub mod movie_document;
pub mod movie_row;

pub use change::{ChangeRecord, EntityKind};
pub use checkpoint::Checkpoint;
pub use movie_document::{MovieDocument, PersonRef};
pub use movie_row::{MovieRow, PersonRole};
