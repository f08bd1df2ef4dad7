//! Change cursors.
//!
//! A cursor follows one change feed and remembers, through the checkpoint
//! store, how far it got. Each call to `detect_next` hands out at most one
//! change and advances the persisted position past it.

mod change_cursor;

pub use change_cursor::{parse_watermark, ChangeCursor};
