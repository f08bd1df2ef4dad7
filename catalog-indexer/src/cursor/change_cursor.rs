use std::sync::Arc;

use catalog_indexer_repository::{CatalogSource, ChangeFeed, CheckpointStore};
use catalog_indexer_shared::{ChangeRecord, Checkpoint};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, instrument, warn};

use crate::errors::CursorError;

/// Parses a stored watermark.
///
/// Accepts RFC 3339 as well as the space separated form
/// `2021-06-16 20:14:09.221855+00:00`.
pub fn parse_watermark(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Detects changes on one feed, one at a time.
///
/// Changes are ordered by `updated_at`. The checkpoint is a watermark plus
/// an offset into the changes sharing the window after it, so that rows
/// with identical timestamps are never skipped: the watermark only moves
/// once the last change of the window has been handed out.
///
/// The cursor caches its checkpoint and writes every change to the store
/// before returning the detected record.
pub struct ChangeCursor {
    feed: ChangeFeed,
    store: Arc<dyn CheckpointStore>,
    checkpoint: Checkpoint,
}

impl ChangeCursor {
    /// Restores the cursor's position from the checkpoint store.
    ///
    /// A missing watermark starts from the initial lookback. A stored
    /// value that cannot be parsed is logged and replaced by the same
    /// default; an unparsable offset becomes 0.
    pub async fn restore(
        feed: ChangeFeed,
        store: Arc<dyn CheckpointStore>,
    ) -> Result<Self, CursorError> {
        let unprocessed_from = match store.get_state(&feed.unprocessed_from_key()).await? {
            Some(raw) => parse_watermark(&raw).unwrap_or_else(|| {
                warn!(
                    feed = %feed,
                    value = %raw,
                    "Unparsable watermark in checkpoint, starting from the default"
                );
                Checkpoint::initial_watermark()
            }),
            None => Checkpoint::initial_watermark(),
        };

        let offset = match store.get_state(&feed.offset_key()).await? {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(offset) if offset >= 0 => offset,
                _ => {
                    warn!(feed = %feed, value = %raw, "Unparsable offset in checkpoint, using 0");
                    0
                }
            },
            None => 0,
        };

        let checkpoint = Checkpoint::new(unprocessed_from, offset);
        debug!(
            feed = %feed,
            unprocessed_from = %checkpoint.unprocessed_from,
            offset = checkpoint.offset,
            "Restored change cursor"
        );

        Ok(Self {
            feed,
            store,
            checkpoint,
        })
    }

    pub fn feed(&self) -> ChangeFeed {
        self.feed
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.checkpoint
    }

    /// Returns the next change after the checkpoint, if any, and persists
    /// the position following it.
    ///
    /// When nothing is left the checkpoint is not touched, so polling an
    /// idle feed is free of side effects.
    #[instrument(skip(self, source), fields(feed = %self.feed))]
    pub async fn detect_next(
        &mut self,
        source: &dyn CatalogSource,
    ) -> Result<Option<ChangeRecord>, CursorError> {
        let Checkpoint {
            unprocessed_from,
            offset,
        } = self.checkpoint;

        let Some(change) = source
            .changed_since(self.feed, unprocessed_from, offset)
            .await?
        else {
            return Ok(None);
        };

        let remaining = source
            .count_changed_since(self.feed, unprocessed_from, offset)
            .await?;

        let next = self.checkpoint.advanced(remaining, change.updated_at);
        self.persist(next).await?;

        debug!(
            kind = %change.entity_kind,
            entity_id = %change.entity_id,
            updated_at = %change.updated_at,
            remaining = remaining,
            "Detected change"
        );

        Ok(Some(change))
    }

    /// Writes `next` through to the store.
    ///
    /// The offset goes first: if the process dies between the two writes
    /// the old watermark is kept with offset 0, which re-delivers changes
    /// instead of skipping them.
    async fn persist(&mut self, next: Checkpoint) -> Result<(), CursorError> {
        self.store
            .set_state(&self.feed.offset_key(), &next.offset.to_string())
            .await?;
        self.checkpoint.offset = next.offset;

        if next.unprocessed_from != self.checkpoint.unprocessed_from {
            self.store
                .set_state(
                    &self.feed.unprocessed_from_key(),
                    &next.unprocessed_from.to_rfc3339(),
                )
                .await?;
            self.checkpoint.unprocessed_from = next.unprocessed_from;
        }

        Ok(())
    }
}
