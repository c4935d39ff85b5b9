//! Core domain models for the chat overlay.
//!
//! Raw events as observed in the host document, and the render items the
//! pipeline derives from them. These are plain data types with no I/O or
//! rendering dependencies.

pub mod event;
pub mod item;

pub use event::{ContentNode, RawEvent, RoleMarker};
pub use item::{ContentRun, EmoteAlign, HslColor, RenderItem, RoleClass};
