//! Poll scheduler.
//!
//! A pure state machine over [`Instant`]. It owns no timer: the caller asks
//! for [`PollScheduler::next_deadline`], sleeps until then by whatever means
//! it has, and calls [`PollScheduler::advance`] with the current time.
//!
//! Two trigger sources feed one debounce deadline: the periodic interval
//! tick and explicit [`PollScheduler::trigger`] calls (host mutation
//! notifications). Re-triggering before the deadline pushes it back, so a
//! burst of triggers produces one extraction.

use crate::config::{DEBOUNCE, POLL_INTERVAL};
use std::time::{Duration, Instant};
use tracing::{debug, info};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Active {
        next_tick: Instant,
        pending: Option<Instant>,
    },
}

/// Interval + debounce scheduler for extraction cycles.
///
/// # Examples
///
/// ```
/// use chat_overlay::schedule::PollScheduler;
/// use std::time::{Duration, Instant};
///
/// let start = Instant::now();
/// let mut scheduler = PollScheduler::default();
/// assert!(scheduler.activate(start));
///
/// // First tick at 800ms arms the debounce, which fires at 1300ms.
/// assert!(!scheduler.advance(start + Duration::from_millis(1_000)));
/// assert!(scheduler.advance(start + Duration::from_millis(1_300)));
///
/// scheduler.deactivate();
/// assert!(!scheduler.advance(start + Duration::from_secs(60)));
/// ```
#[derive(Debug, Clone)]
pub struct PollScheduler {
    interval: Duration,
    debounce: Duration,
    state: State,
    generation: u64,
}

impl PollScheduler {
    /// Creates an idle scheduler.
    #[must_use]
    pub fn new(interval: Duration, debounce: Duration) -> Self {
        Self {
            interval: interval.max(MIN_INTERVAL),
            debounce,
            state: State::Idle,
            generation: 0,
        }
    }

    /// Starts polling at `now`, cancelling any previous activation first.
    ///
    /// Returns `true`: an extraction is due immediately on activation.
    pub fn activate(&mut self, now: Instant) -> bool {
        if self.is_active() {
            debug!(generation = self.generation, "cancelling previous activation");
        }
        self.generation += 1;
        self.state = State::Active {
            next_tick: now + self.interval,
            pending: None,
        };
        info!(generation = self.generation, "polling started");
        true
    }

    /// Stops polling. Returns whether it was active.
    pub fn deactivate(&mut self) -> bool {
        let was_active = self.is_active();
        self.state = State::Idle;
        if was_active {
            info!(generation = self.generation, "polling stopped");
        }
        was_active
    }

    /// Arms (or re-arms) the debounce deadline at `now + debounce`.
    ///
    /// Ignored while idle. Returns whether the trigger was accepted.
    pub fn trigger(&mut self, now: Instant) -> bool {
        match &mut self.state {
            State::Idle => false,
            State::Active { pending, .. } => {
                *pending = Some(now + self.debounce);
                true
            }
        }
    }

    /// Moves the clock to `now`.
    ///
    /// Interval ticks that came due are replayed in order, each re-arming
    /// the debounce. Returns `true` if a debounce deadline passed, at most
    /// once per call however many passed.
    pub fn advance(&mut self, now: Instant) -> bool {
        let State::Active { next_tick, pending } = &mut self.state else {
            return false;
        };

        let mut fired = false;
        loop {
            let tick = *next_tick;
            if pending.is_some_and(|deadline| deadline <= now && deadline <= tick) {
                *pending = None;
                fired = true;
                continue;
            }
            if *next_tick <= now {
                *pending = Some(*next_tick + self.debounce);
                *next_tick += self.interval;
                continue;
            }
            break;
        }
        fired
    }

    /// Earliest instant at which [`advance`](Self::advance) can change
    /// state, or `None` while idle.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            State::Idle => None,
            State::Active { next_tick, pending } => {
                Some(pending.map_or(next_tick, |deadline| deadline.min(next_tick)))
            }
        }
    }

    /// Whether polling is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, State::Active { .. })
    }

    /// Number of activations so far.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Configured interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Configured debounce.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        self.debounce
    }
}

impl Default for PollScheduler {
    fn default() -> Self {
        Self::new(POLL_INTERVAL, DEBOUNCE)
    }
}
