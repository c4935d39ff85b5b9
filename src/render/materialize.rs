//! Turns render items into pooled node trees.

use crate::core::{ContentRun, RenderItem};
use crate::identity::role_color;
use crate::ingest::PLACEHOLDER_AVATAR;
use crate::render::node::{NodeRole, RenderNode};
use crate::render::pool::NodePool;

/// Display toggles applied while materializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Show author avatars.
    pub show_avatars: bool,
    /// Show capture-time labels.
    pub show_timestamps: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_avatars: true,
            show_timestamps: true,
        }
    }
}

/// The node tree of one displayed message.
///
/// Avatar and timestamp nodes always exist; when their display toggle is
/// off they are hidden with an inline style, so the toggle can be flipped
/// on already-displayed messages.
#[derive(Debug)]
pub struct MessageNodes {
    /// Outer message element.
    pub container: RenderNode,
    /// Avatar image.
    pub avatar: RenderNode,
    /// Capture-time label.
    pub timestamp: RenderNode,
    /// Badge image, when the author has one.
    pub badge: Option<RenderNode>,
    /// Author name.
    pub author: RenderNode,
    /// Content runs in order.
    pub runs: Vec<RenderNode>,
}

impl MessageNodes {
    /// Number of nodes in the tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        4 + usize::from(self.badge.is_some()) + self.runs.len()
    }

    /// Message id stamped on the container.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.container.attribute(MESSAGE_ID_ATTR)
    }

    /// One-line text rendering: `HH:MM Author: body`, honoring hidden
    /// timestamps.
    #[must_use]
    pub fn to_line(&self) -> String {
        let mut line = String::new();
        if self.timestamp.style("display") != Some("none") {
            line.push_str(self.timestamp.text());
            line.push(' ');
        }
        line.push_str(self.author.text());
        line.push_str(": ");
        for run in &self.runs {
            match run.role() {
                NodeRole::Emote => line.push_str(run.attribute("alt").unwrap_or_default()),
                _ => line.push_str(run.text()),
            }
        }
        line
    }

    /// Re-applies display toggles to an already materialized tree.
    pub fn apply_options(&mut self, options: &RenderOptions) {
        set_shown(&mut self.avatar, options.show_avatars);
        set_shown(&mut self.timestamp, options.show_timestamps);
    }

    /// Consumes the tree, yielding every node.
    pub fn into_nodes(self) -> impl Iterator<Item = RenderNode> {
        [self.container, self.avatar, self.timestamp, self.author]
            .into_iter()
            .chain(self.badge)
            .chain(self.runs)
    }
}

/// Attribute on the container carrying the message id.
pub const MESSAGE_ID_ATTR: &str = "data-message-id";

const ENTER_ANIMATION: &str = "messageFadeSimple 0.1s ease forwards";

/// Builds the node tree for `item` from nodes checked out of `pool`.
pub fn materialize(item: &RenderItem, pool: &mut NodePool, options: &RenderOptions) -> MessageNodes {
    let mut container = pool.acquire(NodeRole::Container);
    container.set_attribute(MESSAGE_ID_ATTR, item.id.as_str());
    container.set_style("animation", ENTER_ANIMATION);

    let mut avatar = pool.acquire(NodeRole::Avatar);
    avatar.set_attribute("src", item.avatar_url.as_str());
    avatar.set_attribute("alt", item.author_name.as_str());
    avatar.set_attribute("data-fallback-src", PLACEHOLDER_AVATAR);
    avatar.add_listener("error");
    set_shown(&mut avatar, options.show_avatars);

    let mut timestamp = pool.acquire(NodeRole::Timestamp);
    timestamp.set_text(item.timestamp_label());
    set_shown(&mut timestamp, options.show_timestamps);

    let badge = item.badge_url.as_deref().map(|url| {
        let mut badge = pool.acquire(NodeRole::Badge);
        badge.set_attribute("src", url);
        badge.set_attribute("alt", "Badge");
        badge
    });

    let mut author = pool.acquire(NodeRole::Author);
    author.set_text(item.author_name.as_str());
    author.add_class(item.role_class.css_class());
    if let Some(color) = role_color(item.role_class) {
        author.set_style("color", color);
    } else if let Some(color) = item.display_color {
        author.set_style("color", color.to_string());
    }

    let runs = item
        .content
        .iter()
        .map(|run| materialize_run(run, pool))
        .collect();

    MessageNodes {
        container,
        avatar,
        timestamp,
        badge,
        author,
        runs,
    }
}

fn set_shown(node: &mut RenderNode, shown: bool) {
    if shown {
        node.remove_style("display");
    } else {
        node.set_style("display", "none");
    }
}

fn materialize_run(run: &ContentRun, pool: &mut NodePool) -> RenderNode {
    match run {
        ContentRun::Text { text } => {
            let mut node = pool.acquire(NodeRole::TextRun);
            node.set_text(text.as_str());
            node
        }
        ContentRun::Emote {
            src,
            alt,
            width,
            height,
            align,
        } => {
            let mut node = pool.acquire(NodeRole::Emote);
            node.set_attribute("src", src.as_str());
            node.set_attribute("alt", alt.as_str());
            node.set_attribute("width", width.to_string());
            node.set_attribute("height", height.to_string());
            node.set_style("vertical-align", align.as_css());
            node
        }
        ContentRun::Verbatim { tag, raw } => {
            let mut node = pool.acquire(NodeRole::TextRun);
            node.set_attribute("data-kind", tag.as_str());
            node.set_text(raw.as_str());
            node
        }
    }
}
