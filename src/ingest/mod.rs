//! Ingestion: deduplication and content extraction.
//!
//! Everything between a raw source snapshot and a render item lives here.
//! The dedup window decides which events are new; the extractor turns each
//! new event into a sanitized [`crate::core::RenderItem`].

pub mod dedup;
pub mod extract;

pub use dedup::DedupWindow;
pub use extract::{
    EMOTE_ALIGN, EMOTE_SIZE_PX, ExtractOptions, PLACEHOLDER_AVATAR, UNKNOWN_AUTHOR, extract,
    extract_runs,
};
