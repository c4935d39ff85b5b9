//! Render items.
//!
//! A [`RenderItem`] is the presentation-layer counterpart of a raw event:
//! defaults applied, role resolved, color assigned, content sanitized into
//! runs. It is owned by the presentation buffer from creation until
//! eviction.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Presentation role derived from an author's role markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleClass {
    /// Regular viewer; gets a hashed display color.
    #[default]
    None,
    /// Channel member; drawn in the fixed member color.
    Member,
    /// Moderator; drawn in the fixed moderator color.
    Moderator,
}

impl RoleClass {
    /// CSS class applied to the author node, empty for [`RoleClass::None`].
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Member => "author-member",
            Self::Moderator => "author-moderator",
        }
    }
}

/// A color in HSL space, as emitted into inline styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HslColor {
    /// Hue in degrees, `0..360`.
    pub hue: u16,
    /// Saturation in percent.
    pub saturation: u8,
    /// Lightness in percent.
    pub lightness: u8,
}

impl fmt::Display for HslColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

/// Vertical alignment of an inline emote relative to the text line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmoteAlign {
    /// Centered on the text's x-height.
    Middle,
    /// Sitting on the baseline.
    Baseline,
}

impl EmoteAlign {
    /// CSS `vertical-align` value.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Middle => "middle",
            Self::Baseline => "baseline",
        }
    }
}

/// One sanitized run of message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentRun {
    /// Verbatim text, never interpreted as markup.
    Text {
        /// The text.
        text: String,
    },
    /// Inline image re-tagged with a fixed display size.
    Emote {
        /// Image reference.
        src: String,
        /// Alternative text.
        alt: String,
        /// Display width in pixels.
        width: u32,
        /// Display height in pixels.
        height: u32,
        /// Vertical alignment.
        align: EmoteAlign,
    },
    /// Unknown node kind, passed through as opaque data.
    Verbatim {
        /// Host-reported node kind.
        tag: String,
        /// Raw node data.
        raw: String,
    },
}

impl ContentRun {
    /// Plain-text rendering of the run, used by text sinks and the CLI.
    #[must_use]
    pub fn plain_text(&self) -> &str {
        match self {
            Self::Text { text } => text,
            Self::Emote { alt, .. } => alt,
            Self::Verbatim { raw, .. } => raw,
        }
    }
}

/// A chat message ready to be materialized into render nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderItem {
    /// Id of the raw event this item came from.
    pub id: String,
    /// Author display name (defaulted when missing).
    pub author_name: String,
    /// Presentation role.
    pub role_class: RoleClass,
    /// Hashed name color; only set for [`RoleClass::None`] with colorization on.
    pub display_color: Option<HslColor>,
    /// Avatar image URL (placeholder when the event had none).
    pub avatar_url: String,
    /// Badge image URL.
    pub badge_url: Option<String>,
    /// Sanitized content runs.
    pub content: Vec<ContentRun>,
    /// Capture time.
    pub captured_at: DateTime<Local>,
}

impl RenderItem {
    /// Concatenated plain text of all runs.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.content.iter().map(ContentRun::plain_text).collect()
    }

    /// Capture time as `HH:MM`, the format shown next to the author.
    #[must_use]
    pub fn timestamp_label(&self) -> String {
        self.captured_at.format("%H:%M").to_string()
    }
}
