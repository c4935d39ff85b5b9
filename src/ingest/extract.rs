//! Content extraction.
//!
//! Converts a raw event into a render item. Content is treated strictly as
//! data: text is copied as-is, images are re-tagged as fixed-size emotes,
//! and node kinds we do not recognise are carried through untouched.
//! Nothing here parses or evaluates markup.

use crate::core::{ContentNode, ContentRun, EmoteAlign, RawEvent, RenderItem, RoleClass};
use crate::error::ExtractError;
use crate::identity::{assign_color, classify};
use chrono::Local;

/// Author name used when the host rendered none.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Display size of inline emotes, in pixels (square).
pub const EMOTE_SIZE_PX: u32 = 24;

/// Vertical alignment of inline emotes.
pub const EMOTE_ALIGN: EmoteAlign = EmoteAlign::Middle;

/// Generic silhouette shown when an author has no avatar.
pub const PLACEHOLDER_AVATAR: &str = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'%3E%3Cpath fill='%23999' d='M12 2C6.48 2 2 6.48 2 12s4.48 10 10 10 10-4.48 10-10S17.52 2 12 2zm0 3c1.66 0 3 1.34 3 3s-1.34 3-3 3-3-1.34-3-3 1.34-3 3-3zm0 14.2c-2.5 0-4.71-1.28-6-3.22.03-1.99 4-3.08 6-3.08 1.99 0 5.97 1.09 6 3.08-1.29 1.94-3.5 3.22-6 3.22z'/%3E%3C/svg%3E";

/// Options that affect extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Assign hashed colors to regular viewers.
    pub colorize: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self { colorize: true }
    }
}

/// Builds a render item from one raw event.
///
/// Missing author data is defaulted. The item is rejected only when it has
/// no id or its content cannot be represented.
///
/// # Errors
///
/// Returns [`ExtractError::MissingId`] for a blank id and
/// [`ExtractError::EmptyImageSource`] for an image node without a source.
///
/// # Examples
///
/// ```
/// use chat_overlay::core::{ContentNode, RawEvent, RoleClass};
/// use chat_overlay::ingest::{ExtractOptions, extract};
///
/// let event = RawEvent::new("m1", "Alice")
///     .with_content(vec![ContentNode::text("<b>hi</b>")]);
/// let item = extract(&event, &ExtractOptions::default()).unwrap();
/// assert_eq!(item.role_class, RoleClass::None);
/// assert!(item.display_color.is_some());
/// assert_eq!(item.plain_text(), "<b>hi</b>");
/// ```
pub fn extract(event: &RawEvent, options: &ExtractOptions) -> Result<RenderItem, ExtractError> {
    if event.id.trim().is_empty() {
        return Err(ExtractError::MissingId);
    }

    let content = extract_runs(&event.content)?;

    let author_name = non_blank(event.author_name.as_deref())
        .unwrap_or(UNKNOWN_AUTHOR)
        .to_string();
    let role_class = classify(&event.role_markers);
    let display_color = (role_class == RoleClass::None && options.colorize)
        .then(|| assign_color(&author_name));
    let avatar_url = non_blank(event.author_photo_url.as_deref())
        .unwrap_or(PLACEHOLDER_AVATAR)
        .to_string();
    let badge_url = non_blank(event.badge_url.as_deref()).map(ToString::to_string);

    Ok(RenderItem {
        id: event.id.clone(),
        author_name,
        role_class,
        display_color,
        avatar_url,
        badge_url,
        content,
        captured_at: Local::now(),
    })
}

/// Converts content nodes into render runs.
///
/// # Errors
///
/// Returns [`ExtractError::EmptyImageSource`] when an image node has a
/// blank `src`.
pub fn extract_runs(nodes: &[ContentNode]) -> Result<Vec<ContentRun>, ExtractError> {
    nodes
        .iter()
        .enumerate()
        .map(|(index, node)| match node {
            ContentNode::Text { text } => Ok(ContentRun::Text { text: text.clone() }),
            ContentNode::Image { src, alt, .. } => {
                if src.trim().is_empty() {
                    return Err(ExtractError::EmptyImageSource { index });
                }
                Ok(ContentRun::Emote {
                    src: src.clone(),
                    alt: alt.clone(),
                    width: EMOTE_SIZE_PX,
                    height: EMOTE_SIZE_PX,
                    align: EMOTE_ALIGN,
                })
            }
            ContentNode::Other { tag, raw } => Ok(ContentRun::Verbatim {
                tag: tag.clone(),
                raw: raw.clone(),
            }),
        })
        .collect()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
