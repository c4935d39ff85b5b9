//! Recorded captures for offline replay.
//!
//! A capture is a JSON array of polls, each stamped with its offset in
//! milliseconds from the start of the recording:
//!
//! ```json
//! [
//!   { "at_ms": 0,    "events": null },
//!   { "at_ms": 800,  "events": [{ "id": "m1", "author_name": "Alice" }] }
//! ]
//! ```
//!
//! `null` events mean the host document was not available at that time.
//! Events inside a poll are decoded one by one; an undecodable event is
//! logged and dropped without rejecting the capture.

use crate::core::RawEvent;
use crate::error::SourceError;
use crate::source::{Poll, deserialize_events};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One recorded poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedPoll {
    /// Offset from the start of the recording.
    pub at_ms: u64,
    /// Visible events, or `None` when the source was unavailable.
    #[serde(default, deserialize_with = "deserialize_events")]
    pub events: Option<Vec<RawEvent>>,
}

impl CapturedPoll {
    /// The poll outcome this record stands for.
    #[must_use]
    pub fn to_poll(&self) -> Poll {
        self.events
            .as_ref()
            .map_or(Poll::Unavailable, |events| Poll::Ready(events.clone()))
    }
}

/// A whole recording, polls in time order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capture {
    /// Recorded polls.
    pub polls: Vec<CapturedPoll>,
}

impl Capture {
    /// Parses a capture from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidCapture`] if the text is not a capture
    /// or its timestamps go backwards.
    pub fn from_json(text: &str) -> Result<Self, SourceError> {
        let capture: Self = serde_json::from_str(text)?;
        if let Some(pair) = capture
            .polls
            .windows(2)
            .find(|pair| pair[1].at_ms < pair[0].at_ms)
        {
            return Err(SourceError::InvalidCapture(format!(
                "poll at {}ms follows poll at {}ms",
                pair[1].at_ms, pair[0].at_ms
            )));
        }
        Ok(capture)
    }

    /// Reads and parses a capture file.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::ReadFailed`] if the file cannot be read, or
    /// any error from [`Capture::from_json`].
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let text = std::fs::read_to_string(path).map_err(|e| SourceError::ReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&text)
    }

    /// Offset of the last poll.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.polls.last().map_or(0, |poll| poll.at_ms)
    }
}
