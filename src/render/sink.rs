//! Render sink and viewport seams.
//!
//! A sink is told about every append and every eviction, one call per
//! message, in buffer order. A viewport exposes scroll geometry for the
//! scroll anchor. Real displays implement both; [`MemorySink`] simulates
//! them with fixed-height rows.

use crate::render::materialize::MessageNodes;
use std::collections::VecDeque;

/// Receives materialized messages as the buffer changes.
pub trait RenderSink {
    /// A message was appended at the end of the buffer.
    fn append(&mut self, id: &str, nodes: &MessageNodes);

    /// The message at the front of the buffer was evicted. Its nodes are
    /// returned to the pool right after this call.
    fn evict(&mut self, id: &str, nodes: &MessageNodes);
}

/// Scroll geometry of the scrollable message list, in pixels.
pub trait Viewport {
    /// Current scroll offset from the top.
    fn scroll_top(&self) -> u32;

    /// Visible height.
    fn client_height(&self) -> u32;

    /// Total content height.
    fn scroll_height(&self) -> u32;

    /// Scrolls to `offset`, clamped to the valid range.
    fn scroll_to(&mut self, offset: u32);

    /// Largest valid scroll offset.
    fn max_scroll_offset(&self) -> u32 {
        self.scroll_height().saturating_sub(self.client_height())
    }

    /// Scrolls to the end of the content.
    fn scroll_to_bottom(&mut self) {
        let bottom = self.max_scroll_offset();
        self.scroll_to(bottom);
    }
}

/// In-memory sink and viewport with fixed-height rows.
///
/// Keeps one rendered text line per displayed message and counts sink
/// calls, which makes it useful both for assertions and for printing.
#[derive(Debug, Clone)]
pub struct MemorySink {
    rows: VecDeque<(String, String)>,
    row_height: u32,
    client_height: u32,
    scroll_top: u32,
    appends: usize,
    evictions: usize,
}

impl MemorySink {
    /// Creates a sink with the given row and viewport heights.
    #[must_use]
    pub const fn new(row_height: u32, client_height: u32) -> Self {
        Self {
            rows: VecDeque::new(),
            row_height,
            client_height,
            scroll_top: 0,
            appends: 0,
            evictions: 0,
        }
    }

    /// Ids of the displayed messages, oldest first.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(id, _)| id.as_str())
    }

    /// Rendered lines, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(_, line)| line.as_str())
    }

    /// Number of displayed rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether nothing is displayed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total `append` calls received.
    #[must_use]
    pub const fn appends(&self) -> usize {
        self.appends
    }

    /// Total `evict` calls received.
    #[must_use]
    pub const fn evictions(&self) -> usize {
        self.evictions
    }

    fn clamp_scroll(&mut self) {
        self.scroll_top = self.scroll_top.min(self.max_scroll_offset());
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(20, 400)
    }
}

impl RenderSink for MemorySink {
    fn append(&mut self, id: &str, nodes: &MessageNodes) {
        self.rows.push_back((id.to_string(), nodes.to_line()));
        self.appends += 1;
    }

    fn evict(&mut self, id: &str, _nodes: &MessageNodes) {
        if self.rows.front().is_some_and(|(front, _)| front == id) {
            self.rows.pop_front();
        } else if let Some(pos) = self.rows.iter().position(|(row, _)| row == id) {
            tracing::warn!(id, pos, "evicted message was not at the front");
            self.rows.remove(pos);
        }
        self.evictions += 1;
        self.clamp_scroll();
    }
}

impl Viewport for MemorySink {
    fn scroll_top(&self) -> u32 {
        self.scroll_top
    }

    fn client_height(&self) -> u32 {
        self.client_height
    }

    #[allow(clippy::cast_possible_truncation)]
    fn scroll_height(&self) -> u32 {
        (self.rows.len() as u32).saturating_mul(self.row_height)
    }

    fn scroll_to(&mut self, offset: u32) {
        self.scroll_top = offset.min(self.max_scroll_offset());
    }
}
