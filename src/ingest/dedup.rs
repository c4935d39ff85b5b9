//! Bounded window of seen event ids.
//!
//! Membership is answered by a hash set; a queue in insertion order sits
//! beside it so the oldest ids can be purged. Purging happens in batches
//! (a fixed fraction of capacity at once) instead of one id per insert.
//!
//! This is best-effort deduplication: once an id has been purged it may be
//! shown again if the host still lists it. That window of false negatives
//! is bounded by the capacity.

use std::collections::{HashSet, VecDeque};

/// Insertion-ordered, capacity-bounded set of event ids.
///
/// # Examples
///
/// ```
/// use chat_overlay::ingest::DedupWindow;
///
/// let mut window = DedupWindow::new(500, 0.2);
/// assert!(!window.is_seen("m1"));
/// window.mark_seen("m1");
/// window.mark_seen("m1");
/// assert!(window.is_seen("m1"));
/// assert_eq!(window.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DedupWindow {
    seen: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
    batch: usize,
}

impl DedupWindow {
    /// Creates a window holding at most `capacity` ids.
    ///
    /// When an insert pushes the size past `capacity`, the oldest
    /// `ceil(capacity * eviction_fraction)` ids are dropped together
    /// (at least one, at most all of them).
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn new(capacity: usize, eviction_fraction: f64) -> Self {
        let capacity = capacity.max(1);
        let batch = ((capacity as f64) * eviction_fraction).ceil() as usize;
        Self {
            seen: HashSet::with_capacity(capacity + 1),
            order: VecDeque::with_capacity(capacity + 1),
            capacity,
            batch: batch.clamp(1, capacity),
        }
    }

    /// Whether `id` is currently remembered.
    #[must_use]
    pub fn is_seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Remembers `id`. Marking an id already present changes nothing,
    /// including its age.
    pub fn mark_seen(&mut self, id: impl Into<String>) {
        let id = id.into();
        if self.seen.contains(&id) {
            return;
        }
        self.seen.insert(id.clone());
        self.order.push_back(id);

        if self.seen.len() > self.capacity {
            self.purge_oldest();
        }
    }

    fn purge_oldest(&mut self) {
        let count = self.batch.min(self.order.len());
        for id in self.order.drain(..count) {
            self.seen.remove(&id);
        }
        tracing::debug!(
            purged = count,
            remaining = self.seen.len(),
            "dedup window purged oldest ids"
        );
    }

    /// Number of ids currently remembered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether the window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Maximum number of ids kept.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of ids dropped per overflow.
    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch
    }

    /// Forgets every id.
    pub fn clear(&mut self) {
        self.seen.clear();
        self.order.clear();
    }
}

impl Default for DedupWindow {
    fn default() -> Self {
        Self::new(crate::config::MAX_PROCESSED_IDS, crate::config::EVICTION_FRACTION)
    }
}
