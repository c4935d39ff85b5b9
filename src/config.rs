//! Pipeline policy knobs.
//!
//! These are fixed limits rather than user settings. [`Limits::default`]
//! yields the production values; tests shrink them to exercise eviction
//! without feeding hundreds of events.

use crate::error::{Error, Result};
use std::time::Duration;

/// Maximum number of rendered messages kept in the presentation buffer.
pub const MAX_MESSAGES: usize = 100;

/// Maximum number of events taken from the tail of one source snapshot.
pub const MAX_NEW_MESSAGES_PER_CYCLE: usize = 100;

/// Maximum number of ids remembered by the dedup window.
pub const MAX_PROCESSED_IDS: usize = 500;

/// Fraction of the dedup window purged in one batch once it overflows.
pub const EVICTION_FRACTION: f64 = 0.2;

/// Period between scheduled extraction triggers.
pub const POLL_INTERVAL: Duration = Duration::from_millis(800);

/// Quiet period that collapses bursts of triggers into one extraction.
pub const DEBOUNCE: Duration = Duration::from_millis(500);

/// Distance from the maximum scroll offset still treated as "at bottom".
pub const BOTTOM_THRESHOLD_PX: u32 = 50;

/// Idle nodes kept per structural role after a trim.
pub const MAX_IDLE_NODES_PER_ROLE: usize = 200;

/// Complete set of limits used by one overlay session.
#[derive(Debug, Clone, PartialEq)]
pub struct Limits {
    /// Presentation buffer capacity.
    pub max_messages: usize,
    /// Events considered per poll snapshot (newest first kept).
    pub max_new_per_cycle: usize,
    /// Dedup window capacity.
    pub max_processed_ids: usize,
    /// Share of the dedup window evicted per overflow, in `(0, 1]`.
    pub eviction_fraction: f64,
    /// Scheduler interval.
    pub poll_interval: Duration,
    /// Scheduler debounce.
    pub debounce: Duration,
    /// Scroll anchor threshold in pixels.
    pub bottom_threshold_px: u32,
    /// Pool trim target per role.
    pub max_idle_per_role: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_messages: MAX_MESSAGES,
            max_new_per_cycle: MAX_NEW_MESSAGES_PER_CYCLE,
            max_processed_ids: MAX_PROCESSED_IDS,
            eviction_fraction: EVICTION_FRACTION,
            poll_interval: POLL_INTERVAL,
            debounce: DEBOUNCE,
            bottom_threshold_px: BOTTOM_THRESHOLD_PX,
            max_idle_per_role: MAX_IDLE_NODES_PER_ROLE,
        }
    }
}

impl Limits {
    /// Checks that every capacity is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a capacity is zero, the eviction
    /// fraction is outside `(0, 1]`, or the poll interval is zero.
    pub fn validate(&self) -> Result<()> {
        let fail = |message: &str| {
            Err(Error::Config {
                message: message.to_string(),
            })
        };
        if self.max_messages == 0 {
            return fail("max_messages must be > 0");
        }
        if self.max_new_per_cycle == 0 {
            return fail("max_new_per_cycle must be > 0");
        }
        if self.max_processed_ids == 0 {
            return fail("max_processed_ids must be > 0");
        }
        if !(self.eviction_fraction > 0.0 && self.eviction_fraction <= 1.0) {
            return fail("eviction_fraction must be in (0, 1]");
        }
        if self.poll_interval.is_zero() {
            return fail("poll_interval must be > 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_are_valid() {
        let limits = Limits::default();
        assert!(limits.validate().is_ok());
        assert_eq!(limits.max_messages, 100);
        assert_eq!(limits.max_processed_ids, 500);
        assert_eq!(limits.poll_interval, Duration::from_millis(800));
        assert_eq!(limits.debounce, Duration::from_millis(500));
        assert_eq!(limits.bottom_threshold_px, 50);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let limits = Limits {
            max_messages: 0,
            ..Limits::default()
        };
        let err = limits.validate().unwrap_err();
        assert!(err.to_string().contains("max_messages"));
    }

    #[test]
    fn test_eviction_fraction_bounds() {
        for fraction in [0.0, -0.5, 1.5] {
            let limits = Limits {
                eviction_fraction: fraction,
                ..Limits::default()
            };
            assert!(limits.validate().is_err(), "fraction {fraction}");
        }
        let limits = Limits {
            eviction_fraction: 1.0,
            ..Limits::default()
        };
        assert!(limits.validate().is_ok());
    }
}
