//! Rendering: pooled nodes, the bounded presentation buffer, and scroll
//! anchoring.
//!
//! The crate does not know how nodes are finally displayed. It hands
//! materialized node trees to a [`RenderSink`] and reads scroll geometry
//! from a [`Viewport`]; [`MemorySink`] implements both for tests and the
//! CLI.

pub mod anchor;
pub mod buffer;
pub mod materialize;
pub mod node;
pub mod pool;
pub mod sink;

pub use anchor::ScrollAnchor;
pub use buffer::{AppendOutcome, DisplayedEntry, PresentationBuffer};
pub use materialize::{MessageNodes, RenderOptions, materialize};
pub use node::{NodeId, NodeRole, RenderNode};
pub use pool::{NodePool, PoolStats};
pub use sink::{MemorySink, RenderSink, Viewport};
