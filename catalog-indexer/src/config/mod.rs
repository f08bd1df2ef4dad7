//! Configuration and dependency initialization.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{CursorMode, ElasticSettings, PostgresSettings, Settings};
