//! Snapshot-file source.
//!
//! Reads a JSON array of events from a file that some other process keeps
//! rewriting (a browser bridge, a scraper). A missing file or a file caught
//! mid-write reads as [`Poll::Unavailable`]. Entries are decoded one by
//! one, so a single bad event does not hide the rest of the snapshot.

use crate::source::{EventSource, Poll, decode_events};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source backed by a JSON snapshot file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Creates a source reading `path` on every poll.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSource for JsonFileSource {
    fn poll(&mut self) -> Poll {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) => {
                debug!(path = %self.path.display(), %err, "snapshot not readable");
                return Poll::Unavailable;
            }
        };
        match serde_json::from_str::<Vec<Value>>(&data) {
            Ok(entries) => Poll::Ready(decode_events(entries)),
            Err(err) => {
                debug!(path = %self.path.display(), %err, "snapshot not parseable");
                Poll::Unavailable
            }
        }
    }
}
