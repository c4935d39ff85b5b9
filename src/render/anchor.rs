//! Scroll anchoring around a buffer mutation.
//!
//! The decision to follow new content is made from the geometry *before*
//! the mutation. Appending and evicting both change the scroll height, so
//! re-checking afterwards would misjudge a reader who was at the bottom.

use crate::render::sink::Viewport;

/// Pre-mutation snapshot of whether the viewport was at the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollAnchor {
    at_bottom: bool,
}

impl ScrollAnchor {
    /// Records whether the viewport is within `threshold_px` of its
    /// maximum scroll offset.
    #[must_use]
    pub fn capture(viewport: &dyn Viewport, threshold_px: u32) -> Self {
        let visible_end = u64::from(viewport.scroll_top()) + u64::from(viewport.client_height());
        let limit = u64::from(viewport.scroll_height()).saturating_sub(u64::from(threshold_px));
        Self {
            at_bottom: visible_end >= limit,
        }
    }

    /// Whether the viewport was at the bottom when captured.
    #[must_use]
    pub const fn was_at_bottom(self) -> bool {
        self.at_bottom
    }

    /// Scrolls to the new bottom if the captured state was at the bottom.
    /// Returns whether it scrolled.
    pub fn apply(self, viewport: &mut dyn Viewport) -> bool {
        if self.at_bottom {
            viewport.scroll_to_bottom();
        }
        self.at_bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        top: u32,
        client: u32,
        height: u32,
    }

    impl Viewport for Fixed {
        fn scroll_top(&self) -> u32 {
            self.top
        }
        fn client_height(&self) -> u32 {
            self.client
        }
        fn scroll_height(&self) -> u32 {
            self.height
        }
        fn scroll_to(&mut self, offset: u32) {
            self.top = offset.min(self.max_scroll_offset());
        }
    }

    #[test]
    fn test_exactly_at_bottom() {
        let v = Fixed {
            top: 600,
            client: 400,
            height: 1000,
        };
        assert!(ScrollAnchor::capture(&v, 50).was_at_bottom());
    }

    #[test]
    fn test_within_threshold() {
        let v = Fixed {
            top: 550,
            client: 400,
            height: 1000,
        };
        assert!(ScrollAnchor::capture(&v, 50).was_at_bottom());

        let v = Fixed {
            top: 549,
            client: 400,
            height: 1000,
        };
        assert!(!ScrollAnchor::capture(&v, 50).was_at_bottom());
    }

    #[test]
    fn test_content_shorter_than_viewport() {
        let v = Fixed {
            top: 0,
            client: 400,
            height: 100,
        };
        assert!(ScrollAnchor::capture(&v, 50).was_at_bottom());
    }

    #[test]
    fn test_apply_uses_captured_state() {
        let mut v = Fixed {
            top: 600,
            client: 400,
            height: 1000,
        };
        let anchor = ScrollAnchor::capture(&v, 50);
        v.height = 1500;
        assert!(anchor.apply(&mut v));
        assert_eq!(v.top, 1100);

        let mut v = Fixed {
            top: 100,
            client: 400,
            height: 1000,
        };
        let anchor = ScrollAnchor::capture(&v, 50);
        v.height = 1500;
        assert!(!anchor.apply(&mut v));
        assert_eq!(v.top, 100);
    }
}
