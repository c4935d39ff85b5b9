//! # chat-overlay
//!
//! A bounded, incremental pipeline that keeps a live chat overlay in sync
//! with a chat feed it does not control.
//!
//! Each cycle takes a snapshot of the visible chat events, keeps only the
//! ones not seen before, turns them into sanitized render items, and
//! appends them to a capped on-screen list. Memory stays bounded in every
//! direction: the list evicts its oldest messages, the seen-id window
//! purges its oldest ids in batches, and render nodes are recycled through
//! a pool.
//!
//! ## Features
//!
//! - **Deduplication**: bounded window of seen event ids with batch purge
//! - **Extraction**: text copied verbatim, images re-tagged as emotes
//! - **Identity**: role classes and deterministic per-name colors
//! - **Rendering**: pooled node trees, a capped buffer, scroll anchoring
//! - **Scheduling**: interval + debounce, gated on visibility and fullscreen
//! - **Preferences**: persisted in `SQLite`
//!
//! ## Example
//!
//! ```
//! use chat_overlay::config::Limits;
//! use chat_overlay::core::{ContentNode, RawEvent};
//! use chat_overlay::render::MemorySink;
//! use chat_overlay::schedule::OverlaySession;
//! use chat_overlay::settings::MemoryPersistence;
//! use chat_overlay::source::ScriptedSource;
//! use std::time::Instant;
//!
//! let mut source = ScriptedSource::new();
//! source.push_snapshot(vec![
//!     RawEvent::new("m1", "Alice").with_content(vec![ContentNode::text("hi")]),
//! ]);
//! let mut session =
//!     OverlaySession::new(source, MemorySink::default(), MemoryPersistence::new(), Limits::default())
//!         .unwrap();
//!
//! let now = Instant::now();
//! session.set_fullscreen(true, now);
//! session.toggle(now).unwrap();
//! assert_eq!(session.buffer().ids().collect::<Vec<_>>(), ["m1"]);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod identity;
pub mod ingest;
pub mod render;
pub mod schedule;
pub mod settings;
pub mod source;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use core::{ContentNode, ContentRun, HslColor, RawEvent, RenderItem, RoleClass, RoleMarker};

// Re-export pipeline types
pub use config::Limits;
pub use identity::{assign_color, classify};
pub use ingest::{DedupWindow, ExtractOptions, extract};
pub use render::{
    MemorySink, MessageNodes, NodePool, NodeRole, PresentationBuffer, RenderNode, RenderOptions,
    RenderSink, ScrollAnchor, Viewport,
};
pub use schedule::{CycleReport, OverlaySession, PollScheduler};
pub use settings::{
    MemoryPersistence, Persistence, PreferenceKey, Preferences, SqlitePersistence,
};
pub use source::{Capture, EventSource, JsonFileSource, Poll, ScriptedSource};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
