//! Change feed descriptions shared by the source and the change cursors.

use std::fmt;

use catalog_indexer_shared::EntityKind;

/// Checkpoint key prefix of the unified feed.
const UNIFIED_FEED_NAME: &str = "content";

/// A stream of changes a cursor can follow.
///
/// Either the changes of one entity table, or the union of all three
/// tables ordered globally by `updated_at`. The feed determines both the
/// query the source runs and the keys the cursor persists its position
/// under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeFeed {
    Kind(EntityKind),
    Unified,
}

impl ChangeFeed {
    /// One feed per entity kind, movies first.
    pub fn per_kind() -> Vec<ChangeFeed> {
        EntityKind::ALL.iter().copied().map(ChangeFeed::Kind).collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChangeFeed::Kind(kind) => kind.as_str(),
            ChangeFeed::Unified => UNIFIED_FEED_NAME,
        }
    }

    /// Checkpoint key holding the watermark.
    pub fn unprocessed_from_key(&self) -> String {
        format!("{}_unprocessed_from", self.name())
    }

    /// Checkpoint key holding the offset within the watermark's window.
    pub fn offset_key(&self) -> String {
        format!("{}_offset", self.name())
    }
}

impl fmt::Display for ChangeFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
