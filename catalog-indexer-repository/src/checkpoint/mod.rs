//! Checkpoint store implementations.
//!
//! - [`JsonFileCheckpointStore`]: durable store backed by a single JSON file
//! - [`InMemoryCheckpointStore`]: process-local store for tests and dry runs

mod json_file;
mod memory;

pub use json_file::JsonFileCheckpointStore;
pub use memory::InMemoryCheckpointStore;
