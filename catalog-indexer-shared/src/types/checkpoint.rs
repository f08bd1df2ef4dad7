//! Checkpoint position of a change cursor.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How far back the watermark starts on a first run.
pub const INITIAL_LOOKBACK_DAYS: i64 = 365 * 10;

/// Position of a change cursor.
///
/// Every change with `updated_at <= unprocessed_from` has been processed,
/// as have the first `offset` changes ordered after it. `offset` is only
/// meaningful relative to the current `unprocessed_from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub unprocessed_from: DateTime<Utc>,
    pub offset: i64,
}

impl Checkpoint {
    pub fn new(unprocessed_from: DateTime<Utc>, offset: i64) -> Self {
        Self {
            unprocessed_from,
            offset,
        }
    }

    /// Watermark used when nothing has been persisted yet.
    pub fn initial_watermark() -> DateTime<Utc> {
        Utc::now() - Duration::days(INITIAL_LOOKBACK_DAYS)
    }

    /// Returns the position following a detected change.
    ///
    /// `remaining` is the number of rows still ahead in the current window,
    /// the detected one included. While more than one is left the cursor
    /// steps over the detected row inside the window; otherwise the window
    /// is exhausted and the watermark moves to the detected timestamp.
    pub fn advanced(&self, remaining: i64, detected_at: DateTime<Utc>) -> Self {
        if remaining > 1 {
            Self::new(self.unprocessed_from, self.offset + 1)
        } else {
            Self::new(detected_at.max(self.unprocessed_from), 0)
        }
    }
}
