//! Bounded presentation buffer.
//!
//! Holds displayed messages in append order together with their node
//! trees. Appends come in batches: the whole batch is appended first and
//! the overflow is evicted in a single pass afterwards, so a burst costs
//! one eviction pass and one scroll decision rather than one per message.

use crate::core::RenderItem;
use crate::render::materialize::{MessageNodes, RenderOptions, materialize};
use crate::render::pool::NodePool;
use crate::render::sink::RenderSink;
use std::collections::VecDeque;

/// A displayed message and the nodes it occupies.
#[derive(Debug)]
pub struct DisplayedEntry {
    /// The render item.
    pub item: RenderItem,
    /// Its node tree, checked out of the pool.
    pub nodes: MessageNodes,
}

/// Result of one batch append.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Messages appended.
    pub appended: usize,
    /// Ids evicted from the front, oldest first.
    pub evicted: Vec<String>,
}

/// Capped, append-only (with eviction) sequence of displayed messages.
///
/// # Examples
///
/// ```
/// use chat_overlay::core::RawEvent;
/// use chat_overlay::ingest::{ExtractOptions, extract};
/// use chat_overlay::render::{MemorySink, NodePool, PresentationBuffer, RenderOptions};
///
/// let mut buffer = PresentationBuffer::new(2);
/// let mut pool = NodePool::new();
/// let mut sink = MemorySink::default();
/// let items: Vec<_> = ["a", "b", "c"]
///     .iter()
///     .map(|id| extract(&RawEvent::new(*id, "Alice"), &ExtractOptions::default()).unwrap())
///     .collect();
///
/// let outcome = buffer.append_batch(items, &mut pool, &mut sink, &RenderOptions::default());
/// assert_eq!(outcome.evicted, vec!["a".to_string()]);
/// assert_eq!(buffer.ids().collect::<Vec<_>>(), ["b", "c"]);
/// ```
#[derive(Debug)]
pub struct PresentationBuffer {
    entries: VecDeque<DisplayedEntry>,
    capacity: usize,
}

impl PresentationBuffer {
    /// Creates an empty buffer holding at most `capacity` messages.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `items` in order, then evicts overflow from the front.
    ///
    /// Every appended item produces one [`RenderSink::append`] call and
    /// every evicted item one [`RenderSink::evict`] call, after which its
    /// nodes go back to `pool`.
    pub fn append_batch(
        &mut self,
        items: Vec<RenderItem>,
        pool: &mut NodePool,
        sink: &mut dyn RenderSink,
        options: &RenderOptions,
    ) -> AppendOutcome {
        let appended = items.len();
        for item in items {
            let nodes = materialize(&item, pool, options);
            sink.append(&item.id, &nodes);
            self.entries.push_back(DisplayedEntry { item, nodes });
        }

        let mut evicted = Vec::with_capacity(self.entries.len().saturating_sub(self.capacity));
        while self.entries.len() > self.capacity {
            if let Some(entry) = self.entries.pop_front() {
                evicted.push(Self::retire(entry, pool, sink));
            }
        }

        debug_assert!(self.entries.len() <= self.capacity);
        AppendOutcome { appended, evicted }
    }

    /// Evicts everything, returning the number of messages removed.
    pub fn clear(&mut self, pool: &mut NodePool, sink: &mut dyn RenderSink) -> usize {
        let count = self.entries.len();
        while let Some(entry) = self.entries.pop_front() {
            Self::retire(entry, pool, sink);
        }
        count
    }

    fn retire(entry: DisplayedEntry, pool: &mut NodePool, sink: &mut dyn RenderSink) -> String {
        let DisplayedEntry { item, nodes } = entry;
        sink.evict(&item.id, &nodes);
        pool.release_all(nodes.into_nodes());
        item.id
    }

    /// Displayed messages, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &DisplayedEntry> {
        self.entries.iter()
    }

    /// Displayed messages, mutably, oldest first.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DisplayedEntry> {
        self.entries.iter_mut()
    }

    /// Displayed message ids, oldest first.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.item.id.as_str())
    }

    /// Number of displayed messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is displayed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of displayed messages.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for PresentationBuffer {
    fn default() -> Self {
        Self::new(crate::config::MAX_MESSAGES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ContentNode, RawEvent};
    use crate::ingest::{ExtractOptions, extract};
    use crate::render::MemorySink;

    fn items(ids: impl IntoIterator<Item = String>) -> Vec<RenderItem> {
        ids.into_iter()
            .map(|id| {
                let event = RawEvent::new(id, "Alice")
                    .with_content(vec![ContentNode::text("hello")]);
                extract(&event, &ExtractOptions::default()).unwrap()
            })
            .collect()
    }

    fn ids(range: std::ops::RangeInclusive<usize>) -> Vec<String> {
        range.map(|i| format!("m{i}")).collect()
    }

    #[test]
    fn test_append_within_capacity() {
        let mut buffer = PresentationBuffer::new(100);
        let mut pool = NodePool::new();
        let mut sink = MemorySink::default();

        let outcome = buffer.append_batch(
            items(ids(1..=100)),
            &mut pool,
            &mut sink,
            &RenderOptions::default(),
        );
        assert_eq!(outcome.appended, 100);
        assert!(outcome.evicted.is_empty());
        assert_eq!(buffer.ids().collect::<Vec<_>>(), ids(1..=100));
        assert_eq!(sink.appends(), 100);
    }

    #[test]
    fn test_overflow_evicts_front_and_returns_nodes() {
        let mut buffer = PresentationBuffer::new(100);
        let mut pool = NodePool::new();
        let mut sink = MemorySink::default();
        let options = RenderOptions::default();

        buffer.append_batch(items(ids(1..=100)), &mut pool, &mut sink, &options);
        let outstanding = pool.outstanding();
        let per_message = buffer.iter().next().map(|e| e.nodes.node_count()).unwrap();

        let outcome = buffer.append_batch(items(ids(101..=101)), &mut pool, &mut sink, &options);
        assert_eq!(outcome.evicted, vec!["m1".to_string()]);
        assert_eq!(buffer.len(), 100);
        assert_eq!(buffer.ids().collect::<Vec<_>>(), ids(2..=101));
        // m101 was materialized before m1 was evicted, so m1's nodes end up idle.
        assert_eq!(pool.outstanding(), outstanding);
        assert_eq!(pool.total_idle(), per_message);
        assert_eq!(pool.stats().released, per_message as u64);
        assert_eq!(sink.evictions(), 1);
        assert_eq!(sink.ids().collect::<Vec<_>>(), ids(2..=101));
    }

    #[test]
    fn test_batch_larger_than_capacity() {
        let mut buffer = PresentationBuffer::new(3);
        let mut pool = NodePool::new();
        let mut sink = MemorySink::default();
        let outcome = buffer.append_batch(
            items(ids(1..=5)),
            &mut pool,
            &mut sink,
            &RenderOptions::default(),
        );
        assert_eq!(outcome.appended, 5);
        assert_eq!(outcome.evicted, ids(1..=2));
        assert_eq!(buffer.ids().collect::<Vec<_>>(), ids(3..=5));
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut buffer = PresentationBuffer::new(10);
        let mut pool = NodePool::new();
        let mut sink = MemorySink::default();
        buffer.append_batch(items(ids(1..=4)), &mut pool, &mut sink, &RenderOptions::default());

        assert_eq!(buffer.clear(&mut pool, &mut sink), 4);
        assert!(buffer.is_empty());
        assert!(sink.is_empty());
        assert_eq!(pool.outstanding(), 0);
        assert!(pool.total_idle() > 0);
    }
}
