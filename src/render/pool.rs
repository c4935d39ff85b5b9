//! Render node pool.
//!
//! Idle nodes are kept per [`NodeRole`]. Acquiring reuses an idle node of
//! the requested role when one exists; releasing scrubs the node back to
//! its pristine state before it becomes idle, so a recycled node never
//! shows content from its previous message.

use crate::render::node::{NodeId, NodeRole, RenderNode};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, warn};

static NEXT_POOL_ID: AtomicU32 = AtomicU32::new(1);

/// Lifetime counters for a pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Nodes constructed because no idle node of the role existed.
    pub created: u64,
    /// Acquisitions served from the idle lists.
    pub reused: u64,
    /// Nodes returned and made idle.
    pub released: u64,
    /// Releases refused because the node was not checked out here.
    pub rejected: u64,
    /// Idle nodes dropped by [`NodePool::trim`].
    pub trimmed: u64,
}

/// Object pool of render nodes keyed by structural role.
///
/// # Examples
///
/// ```
/// use chat_overlay::render::{NodePool, NodeRole};
///
/// let mut pool = NodePool::new();
/// let mut node = pool.acquire(NodeRole::TextRun);
/// node.set_text("hello");
/// let id = node.id();
/// pool.release(node);
///
/// let again = pool.acquire(NodeRole::TextRun);
/// assert_eq!(again.id(), id);
/// assert!(again.text().is_empty());
/// ```
#[derive(Debug)]
pub struct NodePool {
    id: u32,
    next_serial: u64,
    idle: HashMap<NodeRole, Vec<RenderNode>>,
    outstanding: HashSet<NodeId>,
    stats: PoolStats,
}

impl NodePool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            next_serial: 0,
            idle: HashMap::new(),
            outstanding: HashSet::new(),
            stats: PoolStats::default(),
        }
    }

    /// Checks out a node of `role`, recycled if possible.
    pub fn acquire(&mut self, role: NodeRole) -> RenderNode {
        let node = if let Some(node) = self.idle.get_mut(&role).and_then(Vec::pop) {
            self.stats.reused += 1;
            node
        } else {
            self.next_serial += 1;
            self.stats.created += 1;
            RenderNode::new(NodeId::new(self.id, self.next_serial), role)
        };
        self.outstanding.insert(node.id());
        node
    }

    /// Returns a node to the idle list of its role.
    ///
    /// Releasing a node this pool did not hand out is a contract violation:
    /// it asserts in debug builds and is logged and dropped otherwise.
    pub fn release(&mut self, mut node: RenderNode) {
        let owned = self.outstanding.remove(&node.id());
        debug_assert!(
            owned,
            "node {} released to pool {} which does not own it",
            node.id(),
            self.id
        );
        if !owned {
            warn!(node = %node.id(), pool = self.id, "refusing release of foreign node");
            self.stats.rejected += 1;
            return;
        }

        node.scrub();
        self.stats.released += 1;
        self.idle.entry(node.role()).or_default().push(node);
    }

    /// Releases every node in `nodes`.
    pub fn release_all(&mut self, nodes: impl IntoIterator<Item = RenderNode>) {
        for node in nodes {
            self.release(node);
        }
    }

    /// Caps each role's idle list at `max_idle`, returning how many nodes
    /// were dropped.
    pub fn trim(&mut self, max_idle: usize) -> usize {
        let mut dropped = 0;
        for nodes in self.idle.values_mut() {
            if nodes.len() > max_idle {
                dropped += nodes.len() - max_idle;
                nodes.truncate(max_idle);
            }
        }
        if dropped > 0 {
            self.stats.trimmed += dropped as u64;
            debug!(dropped, max_idle, "trimmed idle render nodes");
        }
        dropped
    }

    /// Idle nodes available for `role`.
    #[must_use]
    pub fn idle_count(&self, role: NodeRole) -> usize {
        self.idle.get(&role).map_or(0, Vec::len)
    }

    /// Idle nodes across all roles.
    #[must_use]
    pub fn total_idle(&self) -> usize {
        self.idle.values().map(Vec::len).sum()
    }

    /// Nodes currently checked out.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Lifetime counters.
    #[must_use]
    pub const fn stats(&self) -> PoolStats {
        self.stats
    }
}

impl Default for NodePool {
    fn default() -> Self {
        Self::new()
    }
}
