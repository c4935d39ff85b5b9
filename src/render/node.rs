//! Render node handles.
//!
//! A [`RenderNode`] stands in for an expensive display element. It is not
//! `Clone`: a handle is moved between the pool and the presentation
//! buffer, so at any moment exactly one of them owns it.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a node, unique across all pools in the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId {
    pool: u32,
    serial: u64,
}

impl NodeId {
    pub(crate) const fn new(pool: u32, serial: u64) -> Self {
        Self { pool, serial }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.pool, self.serial)
    }
}

/// Structural role of a node within a rendered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Outer element of one message.
    Container,
    /// Author avatar image.
    Avatar,
    /// Capture-time label.
    Timestamp,
    /// Author name line.
    Author,
    /// Author badge image.
    Badge,
    /// Run of message text.
    TextRun,
    /// Inline emote image.
    Emote,
}

impl NodeRole {
    /// Every role, in display order.
    pub const ALL: [Self; 7] = [
        Self::Container,
        Self::Avatar,
        Self::Timestamp,
        Self::Author,
        Self::Badge,
        Self::TextRun,
        Self::Emote,
    ];

    /// Structural class name. The only attribute that survives a release.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Container => "chat-message",
            Self::Avatar => "chat-message-profile",
            Self::Timestamp => "chat-message-timestamp",
            Self::Author => "chat-message-author",
            Self::Badge => "chat-badge",
            Self::TextRun => "chat-message-text",
            Self::Emote => "chat-emote",
        }
    }
}

/// Attribute holding the structural class.
pub const CLASS_ATTR: &str = "class";

/// A pooled render node.
#[derive(Debug)]
pub struct RenderNode {
    id: NodeId,
    role: NodeRole,
    text: String,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    listeners: Vec<String>,
}

impl RenderNode {
    pub(crate) fn new(id: NodeId, role: NodeRole) -> Self {
        let mut node = Self {
            id,
            role,
            text: String::new(),
            attributes: BTreeMap::new(),
            styles: BTreeMap::new(),
            listeners: Vec::new(),
        };
        node.reset_class();
        node
    }

    /// Node identity.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Structural role.
    #[must_use]
    pub const fn role(&self) -> NodeRole {
        self.role
    }

    /// Text content.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the text content.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Looks up an attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// All attributes, sorted by name.
    #[must_use]
    pub const fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Sets an attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Appends a class to the structural class list.
    pub fn add_class(&mut self, class: &str) {
        if class.is_empty() {
            return;
        }
        let entry = self.attributes.entry(CLASS_ATTR.to_string()).or_default();
        if !entry.split_whitespace().any(|existing| existing == class) {
            if !entry.is_empty() {
                entry.push(' ');
            }
            entry.push_str(class);
        }
    }

    /// Looks up an inline style property.
    #[must_use]
    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }

    /// All inline style properties.
    #[must_use]
    pub const fn styles(&self) -> &BTreeMap<String, String> {
        &self.styles
    }

    /// Sets an inline style property.
    pub fn set_style(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.styles.insert(property.into(), value.into());
    }

    /// Removes an inline style property, returning its old value.
    pub fn remove_style(&mut self, property: &str) -> Option<String> {
        self.styles.remove(property)
    }

    /// Registered event listeners, by event name.
    #[must_use]
    pub fn listeners(&self) -> &[String] {
        &self.listeners
    }

    /// Registers a listener for an event.
    pub fn add_listener(&mut self, event: impl Into<String>) {
        self.listeners.push(event.into());
    }

    /// Whether the node carries nothing beyond its structural class.
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        self.text.is_empty()
            && self.styles.is_empty()
            && self.listeners.is_empty()
            && self.attributes.len() == 1
            && self.attribute(CLASS_ATTR) == Some(self.role.class_name())
    }

    /// Strips content, listeners, styles and every non-structural attribute.
    pub(crate) fn scrub(&mut self) {
        self.text.clear();
        self.styles.clear();
        self.listeners.clear();
        self.attributes.clear();
        self.reset_class();
    }

    fn reset_class(&mut self) {
        self.attributes
            .insert(CLASS_ATTR.to_string(), self.role.class_name().to_string());
    }
}
