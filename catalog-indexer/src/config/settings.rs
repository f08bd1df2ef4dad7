//! Settings read from the environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use catalog_indexer_repository::elastic::DEFAULT_INDEX_NAME;
use catalog_indexer_repository::ChangeFeed;
use sqlx::postgres::PgConnectOptions;

use crate::retry::BackoffPolicy;
use crate::IndexingError;

/// Default PostgreSQL host.
const DEFAULT_POSTGRES_HOST: &str = "localhost";

/// Default PostgreSQL port.
const DEFAULT_POSTGRES_PORT: u16 = 5432;

/// Default Elasticsearch host.
const DEFAULT_ELASTIC_HOST: &str = "localhost";

/// Default Elasticsearch port.
const DEFAULT_ELASTIC_PORT: u16 = 9200;

/// Default checkpoint file.
const DEFAULT_STATE_FILE: &str = "state.json";

/// Default first backoff wait in milliseconds.
const DEFAULT_BACKOFF_BASE_MS: u64 = 100;

/// Default backoff ceiling in seconds.
const DEFAULT_BACKOFF_MAX_SECS: u64 = 60;

/// Which change feeds the pipeline follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    /// One cursor per table: movies, then genres, then persons.
    PerKind,
    /// A single cursor over all three tables in global `updated_at` order.
    Unified,
}

impl CursorMode {
    pub fn feeds(&self) -> Vec<ChangeFeed> {
        match self {
            CursorMode::PerKind => ChangeFeed::per_kind(),
            CursorMode::Unified => vec![ChangeFeed::Unified],
        }
    }
}

impl FromStr for CursorMode {
    type Err = IndexingError;

    /// Valid values: "per-kind" or "unified" (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "per-kind" | "per_kind" | "perkind" => Ok(Self::PerKind),
            "unified" => Ok(Self::Unified),
            other => Err(IndexingError::config(format!(
                "Invalid CURSOR_MODE {:?}, expected \"per-kind\" or \"unified\"",
                other
            ))),
        }
    }
}

/// Connection settings of the catalog database.
#[derive(Clone)]
pub struct PostgresSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl PostgresSettings {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

impl std::fmt::Debug for PostgresSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Location of the search index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElasticSettings {
    pub host: String,
    pub port: u16,
    pub index: String,
}

impl ElasticSettings {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Everything the indexer needs to know to run, validated once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub postgres: PostgresSettings,
    pub elastic: ElasticSettings,
    pub state_file: PathBuf,
    pub cursor_mode: CursorMode,
    pub backoff: BackoffPolicy,
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `POSTGRES_HOST`: Database host (default: localhost)
    /// - `POSTGRES_PORT`: Database port (default: 5432)
    /// - `POSTGRES_USER`, `POSTGRES_PASSWORD`, `POSTGRES_DB`: Required
    /// - `ELASTIC_HOST`: Search index host (default: localhost)
    /// - `ELASTIC_PORT`: Search index port (default: 9200)
    /// - `ELASTIC_INDEX`: Index name (default: movies)
    /// - `STATE_FILE`: Checkpoint file (default: state.json)
    /// - `CURSOR_MODE`: "per-kind" or "unified" (default: per-kind)
    /// - `BACKOFF_BASE_MS`: First backoff wait (default: 100)
    /// - `BACKOFF_MAX_SECS`: Longest backoff wait (default: 60)
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns the value of a variable if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, IndexingError> {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &str| {
            optional(key).ok_or_else(|| IndexingError::config(format!("{} must be set", key)))
        };

        let postgres = PostgresSettings {
            host: optional("POSTGRES_HOST").unwrap_or_else(|| DEFAULT_POSTGRES_HOST.to_string()),
            port: parse_or(optional("POSTGRES_PORT"), "POSTGRES_PORT", DEFAULT_POSTGRES_PORT)?,
            user: required("POSTGRES_USER")?,
            password: required("POSTGRES_PASSWORD")?,
            database: required("POSTGRES_DB")?,
        };

        let elastic = ElasticSettings {
            host: optional("ELASTIC_HOST").unwrap_or_else(|| DEFAULT_ELASTIC_HOST.to_string()),
            port: parse_or(optional("ELASTIC_PORT"), "ELASTIC_PORT", DEFAULT_ELASTIC_PORT)?,
            index: optional("ELASTIC_INDEX").unwrap_or_else(|| DEFAULT_INDEX_NAME.to_string()),
        };

        let state_file = PathBuf::from(
            optional("STATE_FILE").unwrap_or_else(|| DEFAULT_STATE_FILE.to_string()),
        );

        let cursor_mode = match optional("CURSOR_MODE") {
            Some(mode) => mode.parse()?,
            None => CursorMode::PerKind,
        };

        let base_ms = parse_or(
            optional("BACKOFF_BASE_MS"),
            "BACKOFF_BASE_MS",
            DEFAULT_BACKOFF_BASE_MS,
        )?;
        let max_secs = parse_or(
            optional("BACKOFF_MAX_SECS"),
            "BACKOFF_MAX_SECS",
            DEFAULT_BACKOFF_MAX_SECS,
        )?;
        if base_ms == 0 || max_secs == 0 {
            return Err(IndexingError::config(
                "BACKOFF_BASE_MS and BACKOFF_MAX_SECS must be positive",
            ));
        }
        let backoff = BackoffPolicy::new(
            Duration::from_millis(base_ms),
            Duration::from_secs(max_secs),
        );

        Ok(Self {
            postgres,
            elastic,
            state_file,
            cursor_mode,
            backoff,
        })
    }
}

fn parse_or<T: FromStr>(
    value: Option<String>,
    key: &str,
    default: T,
) -> Result<T, IndexingError> {
    match value {
        Some(raw) => raw.trim().parse().map_err(|_| {
            IndexingError::config(format!("{} is not a valid number: {:?}", key, raw))
        }),
        None => Ok(default),
    }
}
