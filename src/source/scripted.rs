//! In-memory scripted source.

use crate::core::RawEvent;
use crate::source::{EventSource, Poll};
use std::collections::VecDeque;

/// Source that plays back queued snapshots.
///
/// Each poll takes the next queued outcome. When the queue is empty the
/// last outcome is repeated, the way a host document that did not change
/// keeps showing the same events.
///
/// # Examples
///
/// ```
/// use chat_overlay::core::RawEvent;
/// use chat_overlay::source::{EventSource, Poll, ScriptedSource};
///
/// let mut source = ScriptedSource::new();
/// assert_eq!(source.poll(), Poll::Unavailable);
///
/// source.push_snapshot(vec![RawEvent::new("m1", "Alice")]);
/// assert!(matches!(source.poll(), Poll::Ready(events) if events.len() == 1));
/// assert!(matches!(source.poll(), Poll::Ready(events) if events.len() == 1));
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    pending: VecDeque<Poll>,
    last: Poll,
}

impl ScriptedSource {
    /// Creates a source that is unavailable until something is queued.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            last: Poll::Unavailable,
        }
    }

    /// Queues an outcome.
    pub fn push(&mut self, poll: Poll) {
        self.pending.push_back(poll);
    }

    /// Queues a ready snapshot.
    pub fn push_snapshot(&mut self, events: Vec<RawEvent>) {
        self.push(Poll::Ready(events));
    }

    /// Queues an unavailable outcome.
    pub fn push_unavailable(&mut self) {
        self.push(Poll::Unavailable);
    }

    /// Drops anything queued and makes `poll` the standing outcome.
    pub fn set(&mut self, poll: Poll) {
        self.pending.clear();
        self.last = poll;
    }

    /// Outcomes still queued.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for ScriptedSource {
    fn poll(&mut self) -> Poll {
        if let Some(next) = self.pending.pop_front() {
            self.last = next;
        }
        self.last.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_then_repeat_last() {
        let mut source = ScriptedSource::new();
        source.push_unavailable();
        source.push_snapshot(vec![RawEvent::new("a", "A")]);
        assert_eq!(source.pending(), 2);

        assert_eq!(source.poll(), Poll::Unavailable);
        assert_eq!(source.poll(), Poll::Ready(vec![RawEvent::new("a", "A")]));
        assert_eq!(source.poll(), Poll::Ready(vec![RawEvent::new("a", "A")]));
        assert_eq!(source.pending(), 0);
    }

    #[test]
    fn test_set_replaces_queue() {
        let mut source = ScriptedSource::new();
        source.push_snapshot(vec![RawEvent::new("a", "A")]);
        source.set(Poll::Unavailable);
        assert_eq!(source.poll(), Poll::Unavailable);
    }
}
