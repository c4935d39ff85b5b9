//! Event source adapters.
//!
//! A source returns a finite, order-preserving snapshot of the events
//! currently visible in the host document, or reports that the document is
//! not ready. "Not ready" is an ordinary outcome, not an error: the cycle
//! does nothing and the next one tries again.

pub mod capture;
pub mod json;
pub mod scripted;

pub use capture::{Capture, CapturedPoll};
pub use json::JsonFileSource;
pub use scripted::ScriptedSource;

use crate::core::RawEvent;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Outcome of polling a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll {
    /// Snapshot of visible events, oldest first.
    Ready(Vec<RawEvent>),
    /// The host document is not available this time.
    Unavailable,
}

/// Something that can be polled for the currently visible chat events.
pub trait EventSource {
    /// Reads the current snapshot.
    fn poll(&mut self) -> Poll;
}

impl<S: EventSource + ?Sized> EventSource for Box<S> {
    fn poll(&mut self) -> Poll {
        (**self).poll()
    }
}

/// Decodes each entry of a snapshot on its own.
///
/// An entry that is not a valid event is logged and dropped; the rest of
/// the snapshot survives in order.
pub fn decode_events(entries: Vec<Value>) -> Vec<RawEvent> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let id = entry.get("id").and_then(Value::as_str).map(str::to_owned);
            RawEvent::deserialize(entry)
                .inspect_err(|err| warn!(index, id = ?id, %err, "skipping undecodable event"))
                .ok()
        })
        .collect()
}

/// Serde adapter for an optional snapshot decoded with [`decode_events`].
pub(crate) fn deserialize_events<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<RawEvent>>, D::Error> {
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.map(decode_events))
}
