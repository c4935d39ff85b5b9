//! Raw chat events.
//!
//! A [`RawEvent`] is a read-only snapshot of one chat entry as it appeared
//! in the host document during a single poll. Only `id` is mandatory; every
//! other field is best-effort and defaults when the host markup omits it.

use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// One externally observed chat entry.
///
/// # Examples
///
/// ```
/// use chat_overlay::core::{ContentNode, RawEvent, RoleMarker};
///
/// let event = RawEvent::new("m1", "Alice")
///     .with_marker(RoleMarker::Member)
///     .with_content(vec![ContentNode::text("hello")]);
/// assert_eq!(event.id, "m1");
/// assert!(event.role_markers.contains(&RoleMarker::Member));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawEvent {
    /// Externally assigned identifier, the sole dedup key.
    #[serde(default)]
    pub id: String,

    /// Display name of the author, if the host rendered one.
    #[serde(default)]
    pub author_name: Option<String>,

    /// Author avatar URL.
    #[serde(default)]
    pub author_photo_url: Option<String>,

    /// Role flags attached to the author element.
    #[serde(default)]
    pub role_markers: BTreeSet<RoleMarker>,

    /// Author badge image URL.
    #[serde(default)]
    pub badge_url: Option<String>,

    /// Message body as an ordered sequence of content tokens.
    #[serde(default)]
    pub content: Vec<ContentNode>,
}

impl RawEvent {
    /// Creates an event with an id and author name and no content.
    #[must_use]
    pub fn new(id: impl Into<String>, author_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            author_name: Some(author_name.into()),
            ..Self::default()
        }
    }

    /// Adds a role marker.
    #[must_use]
    pub fn with_marker(mut self, marker: RoleMarker) -> Self {
        self.role_markers.insert(marker);
        self
    }

    /// Replaces the content nodes.
    #[must_use]
    pub fn with_content(mut self, content: Vec<ContentNode>) -> Self {
        self.content = content;
        self
    }

    /// Sets the avatar URL.
    #[must_use]
    pub fn with_photo(mut self, url: impl Into<String>) -> Self {
        self.author_photo_url = Some(url.into());
        self
    }

    /// Sets the badge URL.
    #[must_use]
    pub fn with_badge(mut self, url: impl Into<String>) -> Self {
        self.badge_url = Some(url.into());
        self
    }
}

/// Role flag carried by the author element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleMarker {
    /// Channel member (sponsor).
    Member,
    /// Chat moderator.
    Moderator,
    /// Channel owner.
    Owner,
    /// Verified account.
    Verified,
    /// Any marker this crate does not know about.
    #[serde(other)]
    Unknown,
}

/// One token of a message body.
///
/// Nodes are tagged by `kind`. A kind this crate does not interpret
/// decodes as [`ContentNode::Other`] holding the node's JSON verbatim; a
/// known kind missing a required field is an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentNode {
    /// Plain text.
    Text {
        /// The text exactly as observed.
        text: String,
    },
    /// Inline image, usually an emote.
    Image {
        /// Image reference.
        src: String,
        /// Alternative text (emote shortcode).
        alt: String,
        /// Hover text, if any.
        tooltip: Option<String>,
    },
    /// Node kind this crate does not interpret.
    Other {
        /// Host-reported node kind.
        tag: String,
        /// Raw serialized node, kept as opaque data.
        raw: String,
    },
}

/// Wire form of the kinds decoded field by field.
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum KnownNode {
    Text {
        text: String,
    },
    Image {
        #[serde(default)]
        src: String,
        #[serde(default)]
        alt: String,
        #[serde(default)]
        tooltip: Option<String>,
    },
    Other {
        #[serde(default)]
        tag: String,
        #[serde(default)]
        raw: String,
    },
}

impl From<KnownNode> for ContentNode {
    fn from(node: KnownNode) -> Self {
        match node {
            KnownNode::Text { text } => Self::Text { text },
            KnownNode::Image { src, alt, tooltip } => Self::Image { src, alt, tooltip },
            KnownNode::Other { tag, raw } => Self::Other { tag, raw },
        }
    }
}

impl<'de> Deserialize<'de> for ContentNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| D::Error::missing_field("kind"))?;
        match kind {
            "text" | "image" | "other" => KnownNode::deserialize(value)
                .map(Self::from)
                .map_err(D::Error::custom),
            unknown => Ok(Self::Other {
                tag: unknown.to_string(),
                raw: value.to_string(),
            }),
        }
    }
}

impl ContentNode {
    /// Shorthand for a text node.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Shorthand for an image node without tooltip.
    #[must_use]
    pub fn image(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self::Image {
            src: src.into(),
            alt: alt.into(),
            tooltip: None,
        }
    }
}
