//! Change records emitted by the change cursors.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Kind of catalog entity a change was detected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Movie,
    Genre,
    Person,
}

impl EntityKind {
    /// All kinds, in the order the per-kind cursors are registered.
    pub const ALL: [EntityKind; 3] = [EntityKind::Movie, EntityKind::Genre, EntityKind::Person];

    /// Lowercase name, also used as the `type` discriminator of the unified feed.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Movie => "movie",
            EntityKind::Genre => "genre",
            EntityKind::Person => "person",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a `type` discriminator does not name a known entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown entity kind: {0}")]
pub struct UnknownEntityKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(EntityKind::Movie),
            "genre" => Ok(EntityKind::Genre),
            "person" => Ok(EntityKind::Person),
            other => Err(UnknownEntityKind(other.to_string())),
        }
    }
}

/// A single changed source row.
///
/// Produced by a change query and consumed immediately by the pipeline;
/// never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub entity_id: Uuid,
    pub entity_kind: EntityKind,
    pub updated_at: DateTime<Utc>,
}

impl ChangeRecord {
    pub fn new(entity_kind: EntityKind, entity_id: Uuid, updated_at: DateTime<Utc>) -> Self {
        Self {
            entity_id,
            entity_kind,
            updated_at,
        }
    }
}
