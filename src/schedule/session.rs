//! Overlay session: one pipeline instance and its gating state.
//!
//! The session owns every piece of pipeline state and is the only thing
//! that mutates it. Polling runs while the overlay is visible *and* the
//! host is fullscreen; losing either condition stops the scheduler and
//! returns every displayed node to the pool before the call returns.

use crate::config::Limits;
use crate::error::Result;
use crate::ingest::{DedupWindow, extract};
use crate::render::{NodePool, PresentationBuffer, RenderSink, ScrollAnchor, Viewport};
use crate::schedule::scheduler::PollScheduler;
use crate::settings::{Persistence, PreferenceKey, Preferences};
use crate::source::{EventSource, Poll};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};

/// What one extraction cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Sequence number of the cycle within the session.
    pub cycle: u64,
    /// Whether the source produced a snapshot.
    pub source_available: bool,
    /// Events in the snapshot.
    pub polled: usize,
    /// Events skipped because their id was already seen.
    pub already_seen: usize,
    /// Events skipped because they could not be extracted.
    pub malformed: usize,
    /// Messages appended to the buffer.
    pub appended: usize,
    /// Messages evicted from the buffer.
    pub evicted: usize,
    /// Whether the viewport followed the new content.
    pub scrolled: bool,
}

/// Running overlay: source, pipeline state and display.
///
/// # Examples
///
/// ```
/// use chat_overlay::config::Limits;
/// use chat_overlay::core::RawEvent;
/// use chat_overlay::render::MemorySink;
/// use chat_overlay::schedule::OverlaySession;
/// use chat_overlay::settings::MemoryPersistence;
/// use chat_overlay::source::ScriptedSource;
/// use std::time::Instant;
///
/// let mut source = ScriptedSource::new();
/// source.push_snapshot(vec![RawEvent::new("m1", "Alice")]);
///
/// let mut session = OverlaySession::new(
///     source,
///     MemorySink::default(),
///     MemoryPersistence::new(),
///     Limits::default(),
/// )
/// .unwrap();
///
/// let now = Instant::now();
/// session.set_fullscreen(true, now);
/// let report = session.set_visible(true, now).unwrap().unwrap();
/// assert_eq!(report.appended, 1);
/// assert_eq!(session.buffer().len(), 1);
/// ```
pub struct OverlaySession<S, K, P>
where
    S: EventSource,
    K: RenderSink + Viewport,
    P: Persistence,
{
    source: S,
    sink: K,
    store: P,
    prefs: Preferences,
    limits: Limits,
    dedup: DedupWindow,
    pool: NodePool,
    buffer: PresentationBuffer,
    scheduler: PollScheduler,
    fullscreen: bool,
    cycles: u64,
}

impl<S, K, P> OverlaySession<S, K, P>
where
    S: EventSource,
    K: RenderSink + Viewport,
    P: Persistence,
{
    /// Creates a session with preferences read from `store`.
    ///
    /// The session starts out of fullscreen, so nothing polls until
    /// [`set_fullscreen`](Self::set_fullscreen) is called.
    ///
    /// # Errors
    ///
    /// Returns an error if `limits` are invalid or `store` cannot be read.
    pub fn new(source: S, sink: K, store: P, limits: Limits) -> Result<Self> {
        limits.validate()?;
        let prefs = Preferences::load(&store)?;
        Ok(Self {
            source,
            sink,
            store,
            prefs,
            dedup: DedupWindow::new(limits.max_processed_ids, limits.eviction_fraction),
            pool: NodePool::new(),
            buffer: PresentationBuffer::new(limits.max_messages),
            scheduler: PollScheduler::new(limits.poll_interval, limits.debounce),
            limits,
            fullscreen: false,
            cycles: 0,
        })
    }

    /// Whether polling conditions hold.
    #[must_use]
    pub const fn is_gated_on(&self) -> bool {
        self.prefs.overlay_visible && self.fullscreen
    }

    /// Flips overlay visibility and persists it.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference cannot be stored.
    pub fn toggle(&mut self, now: Instant) -> Result<Option<CycleReport>> {
        self.set_visible(!self.prefs.overlay_visible, now)
    }

    /// Sets overlay visibility and persists it.
    ///
    /// Returns the activation cycle's report when this turned polling on.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference cannot be stored.
    pub fn set_visible(&mut self, visible: bool, now: Instant) -> Result<Option<CycleReport>> {
        let was_on = self.is_gated_on();
        self.prefs.overlay_visible = visible;
        self.prefs
            .save_key(PreferenceKey::OverlayVisible, &mut self.store)?;
        Ok(self.regate(was_on, now))
    }

    /// Records a fullscreen change. Entering fullscreen honors the saved
    /// visibility; leaving it hides the overlay without touching the
    /// preference.
    pub fn set_fullscreen(&mut self, fullscreen: bool, now: Instant) -> Option<CycleReport> {
        let was_on = self.is_gated_on();
        self.fullscreen = fullscreen;
        self.regate(was_on, now)
    }

    /// Treats the host page as a new stream.
    ///
    /// Displayed messages and seen ids are dropped. Polling restarts if
    /// the overlay is still gated on.
    pub fn navigate(&mut self, now: Instant) -> Option<CycleReport> {
        info!("host navigated, resetting chat tracking");
        self.scheduler.deactivate();
        self.reset_display();
        self.is_gated_on().then(|| self.start(now))
    }

    /// Replaces the preferences, persists them, and applies the display
    /// toggles to messages already on screen.
    ///
    /// Colorization only affects messages extracted afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the preferences cannot be stored.
    pub fn update_preferences(
        &mut self,
        prefs: Preferences,
        now: Instant,
    ) -> Result<Option<CycleReport>> {
        let was_on = self.is_gated_on();
        prefs.save(&mut self.store)?;
        self.prefs = prefs;

        let options = prefs.render_options();
        for entry in self.buffer.iter_mut() {
            entry.nodes.apply_options(&options);
        }
        Ok(self.regate(was_on, now))
    }

    /// Notes a host mutation; the next extraction follows after the
    /// debounce.
    pub fn notify_mutation(&mut self, now: Instant) -> bool {
        self.scheduler.trigger(now)
    }

    /// Advances the scheduler and runs a cycle if it fired.
    pub fn tick(&mut self, now: Instant) -> Option<CycleReport> {
        self.scheduler.advance(now).then(|| self.run_cycle())
    }

    /// When [`tick`](Self::tick) next needs to be called.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Runs one extraction cycle now.
    ///
    /// The cycle never fails: an unavailable source leaves everything as
    /// it was, and malformed events are logged and skipped. While the
    /// scheduler is idle the source is not polled and an empty report is
    /// returned.
    pub fn run_cycle(&mut self) -> CycleReport {
        if !self.scheduler.is_active() {
            debug!(cycles = self.cycles, "overlay idle, cycle skipped");
            return CycleReport {
                cycle: self.cycles,
                ..CycleReport::default()
            };
        }
        self.cycles += 1;
        let mut report = CycleReport {
            cycle: self.cycles,
            ..CycleReport::default()
        };

        let events = match self.source.poll() {
            Poll::Ready(events) => events,
            Poll::Unavailable => {
                debug!(cycle = report.cycle, "source unavailable, nothing to do");
                return report;
            }
        };
        report.source_available = true;
        report.polled = events.len();

        let options = self.prefs.extract_options();
        let start = events.len().saturating_sub(self.limits.max_new_per_cycle);
        let mut fresh = Vec::new();
        for event in &events[start..] {
            if self.dedup.is_seen(&event.id) {
                report.already_seen += 1;
                continue;
            }
            match extract(event, &options) {
                Ok(item) => fresh.push(item),
                Err(err) => {
                    warn!(id = %event.id, %err, "skipping malformed event");
                    report.malformed += 1;
                }
            }
            if !event.id.trim().is_empty() {
                self.dedup.mark_seen(event.id.as_str());
            }
        }

        if fresh.is_empty() {
            debug!(cycle = report.cycle, polled = report.polled, "no new messages");
            return report;
        }

        let anchor = ScrollAnchor::capture(&self.sink, self.limits.bottom_threshold_px);
        let outcome = self.buffer.append_batch(
            fresh,
            &mut self.pool,
            &mut self.sink,
            &self.prefs.render_options(),
        );
        report.scrolled = anchor.apply(&mut self.sink);
        report.appended = outcome.appended;
        report.evicted = outcome.evicted.len();
        self.pool.trim(self.limits.max_idle_per_role);

        debug!(
            cycle = report.cycle,
            appended = report.appended,
            evicted = report.evicted,
            scrolled = report.scrolled,
            displayed = self.buffer.len(),
            "cycle complete"
        );
        report
    }

    fn regate(&mut self, was_on: bool, now: Instant) -> Option<CycleReport> {
        match (was_on, self.is_gated_on()) {
            (false, true) => Some(self.start(now)),
            (true, false) => {
                self.scheduler.deactivate();
                self.reset_display();
                None
            }
            _ => None,
        }
    }

    fn start(&mut self, now: Instant) -> CycleReport {
        self.scheduler.activate(now);
        self.run_cycle()
    }

    fn reset_display(&mut self) {
        let removed = self.buffer.clear(&mut self.pool, &mut self.sink);
        self.dedup.clear();
        self.pool.trim(self.limits.max_idle_per_role);
        debug!(removed, "display reset");
    }

    /// Current preferences.
    #[must_use]
    pub const fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// Whether the host is fullscreen.
    #[must_use]
    pub const fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// The scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &PollScheduler {
        &self.scheduler
    }

    /// Displayed messages.
    #[must_use]
    pub const fn buffer(&self) -> &PresentationBuffer {
        &self.buffer
    }

    /// The node pool.
    #[must_use]
    pub const fn pool(&self) -> &NodePool {
        &self.pool
    }

    /// Seen ids.
    #[must_use]
    pub const fn dedup(&self) -> &DedupWindow {
        &self.dedup
    }

    /// The display.
    #[must_use]
    pub const fn sink(&self) -> &K {
        &self.sink
    }

    /// The display, mutably (to scroll it, for instance).
    pub const fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    /// The event source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// The event source, mutably.
    pub const fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// The preference store.
    #[must_use]
    pub const fn store(&self) -> &P {
        &self.store
    }

    /// Cycles run so far.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ContentNode, RawEvent};
    use crate::render::MemorySink;
    use crate::settings::MemoryPersistence;
    use crate::source::ScriptedSource;
    use std::time::Duration;

    type TestSession = OverlaySession<ScriptedSource, MemorySink, MemoryPersistence>;

    fn event(id: &str) -> RawEvent {
        RawEvent::new(id, "Alice").with_content(vec![ContentNode::text("hi")])
    }

    fn events(ids: std::ops::RangeInclusive<usize>) -> Vec<RawEvent> {
        ids.map(|i| event(&format!("m{i}"))).collect()
    }

    fn session(limits: Limits) -> TestSession {
        OverlaySession::new(
            ScriptedSource::new(),
            MemorySink::default(),
            MemoryPersistence::new(),
            limits,
        )
        .unwrap()
    }

    fn shown(limits: Limits, now: Instant) -> TestSession {
        let mut session = session(limits);
        session.set_fullscreen(true, now);
        session.set_visible(true, now).unwrap();
        session
    }

    #[test]
    fn test_gating_requires_visible_and_fullscreen() {
        let now = Instant::now();
        let mut session = session(Limits::default());
        assert!(!session.is_gated_on());

        assert!(session.set_visible(true, now).unwrap().is_none());
        assert!(!session.scheduler().is_active());

        let report = session.set_fullscreen(true, now).unwrap();
        assert!(!report.source_available);
        assert!(session.scheduler().is_active());

        assert!(session.set_fullscreen(false, now).is_none());
        assert!(!session.scheduler().is_active());
        assert!(session.preferences().overlay_visible);
    }

    #[test]
    fn test_toggle_persists_visibility() {
        let now = Instant::now();
        let mut session = session(Limits::default());
        session.toggle(now).unwrap();
        assert_eq!(
            session.store().get("youtubeOverlayVisible").unwrap(),
            Some("true".to_string())
        );
        session.toggle(now).unwrap();
        assert_eq!(
            session.store().get("youtubeOverlayVisible").unwrap(),
            Some("false".to_string())
        );
    }

    #[test]
    fn test_cycle_skips_seen_and_malformed() {
        let now = Instant::now();
        let mut session = shown(Limits::default(), now);

        let mut snapshot = events(1..=3);
        snapshot.push(RawEvent::new("  ", "Nobody"));
        snapshot.push(RawEvent::new("bad", "Eve").with_content(vec![ContentNode::image("", "x")]));
        session.source_mut().set(Poll::Ready(snapshot));

        let report = session.run_cycle();
        assert_eq!(report.polled, 5);
        assert_eq!(report.appended, 3);
        assert_eq!(report.malformed, 2);
        assert!(session.dedup().is_seen("bad"));

        let report = session.run_cycle();
        assert_eq!(report.appended, 0);
        assert_eq!(report.already_seen, 4);
        assert_eq!(report.malformed, 1);
    }

    #[test]
    fn test_no_cycle_after_hiding() {
        let now = Instant::now();
        let mut session = shown(Limits::default(), now);
        session.set_visible(false, now).unwrap();
        let cycles = session.cycles();

        session.source_mut().push_snapshot(events(1..=3));
        let report = session.run_cycle();
        assert!(!report.source_available);
        assert_eq!(report.appended, 0);
        assert_eq!(report.cycle, cycles);
        assert_eq!(session.cycles(), cycles);
        assert!(session.buffer().is_empty());
        assert!(session.sink().is_empty());
        assert_eq!(session.source().pending(), 1);

        let report = session.set_visible(true, now).unwrap().unwrap();
        assert_eq!(report.appended, 3);
    }

    #[test]
    fn test_duplicate_ids_in_one_snapshot() {
        let now = Instant::now();
        let mut session = shown(Limits::default(), now);
        session
            .source_mut()
            .set(Poll::Ready(vec![event("a"), event("a"), event("b")]));
        let report = session.run_cycle();
        assert_eq!(report.appended, 2);
        assert_eq!(report.already_seen, 1);
    }

    #[test]
    fn test_only_tail_of_snapshot_considered() {
        let now = Instant::now();
        let limits = Limits {
            max_new_per_cycle: 3,
            ..Limits::default()
        };
        let mut session = shown(limits, now);
        session.source_mut().set(Poll::Ready(events(1..=10)));
        session.run_cycle();
        assert_eq!(session.buffer().ids().collect::<Vec<_>>(), ["m8", "m9", "m10"]);
    }

    #[test]
    fn test_hide_releases_nodes_and_clears_dedup() {
        let now = Instant::now();
        let mut session = shown(Limits::default(), now);
        session.source_mut().set(Poll::Ready(events(1..=5)));
        session.run_cycle();
        assert_eq!(session.buffer().len(), 5);

        session.toggle(now).unwrap();
        assert!(session.buffer().is_empty());
        assert!(session.sink().is_empty());
        assert_eq!(session.pool().outstanding(), 0);
        assert!(session.dedup().is_empty());

        let report = session.toggle(now).unwrap().unwrap();
        assert_eq!(report.appended, 5);
    }

    #[test]
    fn test_navigate_resets_and_restarts() {
        let now = Instant::now();
        let mut session = shown(Limits::default(), now);
        session.source_mut().set(Poll::Ready(events(1..=5)));
        session.run_cycle();
        let generation = session.scheduler().generation();

        session.source_mut().set(Poll::Ready(events(100..=101)));
        let report = session.navigate(now).unwrap();
        assert_eq!(report.appended, 2);
        assert_eq!(session.buffer().ids().collect::<Vec<_>>(), ["m100", "m101"]);
        assert_eq!(session.scheduler().generation(), generation + 1);
        assert_eq!(session.dedup().len(), 2);
    }

    #[test]
    fn test_tick_runs_cycle_after_debounce() {
        let now = Instant::now();
        let mut session = shown(Limits::default(), now);
        session.source_mut().set(Poll::Ready(events(1..=1)));

        assert!(session.tick(now + Duration::from_millis(900)).is_none());
        let report = session.tick(now + Duration::from_millis(1_300)).unwrap();
        assert_eq!(report.appended, 1);

        assert!(session.notify_mutation(now + Duration::from_millis(1_400)));
        assert_eq!(
            session.next_deadline(),
            Some(now + Duration::from_millis(1_600))
        );
    }

    #[test]
    fn test_update_preferences_restyles_displayed() {
        let now = Instant::now();
        let mut session = shown(Limits::default(), now);
        session.source_mut().set(Poll::Ready(events(1..=2)));
        session.run_cycle();

        let prefs = Preferences {
            avatars_enabled: false,
            ..*session.preferences()
        };
        assert!(session.update_preferences(prefs, now).unwrap().is_none());
        assert!(
            session
                .buffer()
                .iter()
                .all(|entry| entry.nodes.avatar.style("display") == Some("none"))
        );
        assert_eq!(
            session.store().get("chatAvatarsEnabled").unwrap(),
            Some("false".to_string())
        );
    }
}
