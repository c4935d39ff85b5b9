//! Integration tests for chat-overlay.

#![allow(clippy::expect_used)]

use chat_overlay::config::Limits;
use chat_overlay::core::{ContentNode, RawEvent, RoleMarker};
use chat_overlay::render::{MemorySink, Viewport};
use chat_overlay::schedule::OverlaySession;
use chat_overlay::settings::{MemoryPersistence, Persistence, SqlitePersistence};
use chat_overlay::source::{Poll, ScriptedSource};
use std::time::Instant;
use tempfile::TempDir;

type Session<P = MemoryPersistence> = OverlaySession<ScriptedSource, MemorySink, P>;

fn event(id: &str) -> RawEvent {
    RawEvent::new(id, "Alice").with_content(vec![ContentNode::text("hello")])
}

fn snapshot(ids: std::ops::RangeInclusive<usize>) -> Vec<RawEvent> {
    ids.map(|i| event(&format!("m{i}"))).collect()
}

fn ids(range: std::ops::RangeInclusive<usize>) -> Vec<String> {
    range.map(|i| format!("m{i}")).collect()
}

/// Helper to create a visible, fullscreen session with an empty source.
fn shown_session(limits: Limits) -> Session {
    let mut session = OverlaySession::new(
        ScriptedSource::new(),
        MemorySink::default(),
        MemoryPersistence::new(),
        limits,
    )
    .expect("Failed to create session");
    let now = Instant::now();
    session.set_fullscreen(true, now);
    session.set_visible(true, now).expect("set_visible failed");
    session
}

fn feed(session: &mut Session, events: Vec<RawEvent>) -> chat_overlay::CycleReport {
    session.source_mut().set(Poll::Ready(events));
    session.run_cycle()
}

#[test]
fn test_buffer_keeps_newest_hundred() {
    let mut session = shown_session(Limits::default());

    let report = feed(&mut session, snapshot(1..=100));
    assert_eq!(report.appended, 100);
    assert_eq!(session.buffer().len(), 100);

    let report = feed(&mut session, snapshot(1..=101));
    assert_eq!(report.appended, 1);
    assert_eq!(report.evicted, 1);
    assert_eq!(report.already_seen, 99);
    assert_eq!(session.buffer().ids().collect::<Vec<_>>(), ids(2..=101));
    assert_eq!(session.sink().ids().collect::<Vec<_>>(), ids(2..=101));
}

#[test]
fn test_unavailable_cycles_change_nothing() {
    let mut session = shown_session(Limits::default());
    feed(&mut session, snapshot(1..=10));

    let displayed: Vec<String> = session.buffer().ids().map(String::from).collect();
    let seen = session.dedup().len();
    let stats = session.pool().stats();
    let scroll = session.sink().scroll_top();

    session.source_mut().set(Poll::Unavailable);
    for _ in 0..3 {
        let report = session.run_cycle();
        assert!(!report.source_available);
        assert_eq!(report.appended, 0);
    }

    assert_eq!(
        session.buffer().ids().map(String::from).collect::<Vec<_>>(),
        displayed
    );
    assert_eq!(session.dedup().len(), seen);
    assert_eq!(session.pool().stats(), stats);
    assert_eq!(session.sink().scroll_top(), scroll);
}

#[test]
fn test_scroll_follows_only_at_bottom() {
    let mut session = shown_session(Limits::default());
    let report = feed(&mut session, snapshot(1..=30));
    assert!(report.scrolled);
    assert_eq!(session.sink().scroll_top(), session.sink().max_scroll_offset());

    // Reader scrolled up: appending keeps their position.
    session.sink_mut().scroll_to(0);
    let report = feed(&mut session, snapshot(1..=35));
    assert_eq!(report.appended, 5);
    assert!(!report.scrolled);
    assert_eq!(session.sink().scroll_top(), 0);

    // Back at the bottom: appending follows.
    session.sink_mut().scroll_to_bottom();
    let report = feed(&mut session, snapshot(1..=40));
    assert_eq!(report.appended, 5);
    assert!(report.scrolled);
    assert_eq!(session.sink().scroll_top(), session.sink().max_scroll_offset());
}

#[test]
fn test_evicted_nodes_are_reused() {
    let limits = Limits {
        max_messages: 5,
        ..Limits::default()
    };
    let mut session = shown_session(limits);
    feed(&mut session, snapshot(1..=5));
    let created = session.pool().stats().created;

    for end in 6..=20 {
        feed(&mut session, snapshot(1..=end));
    }
    let stats = session.pool().stats();
    assert_eq!(session.buffer().len(), 5);
    assert!(stats.reused > 0);
    // One spare tree at most: the newest message is built before the
    // oldest is released.
    assert!(stats.created <= created + created / 5);
    let displayed_nodes: usize = session
        .buffer()
        .iter()
        .map(|entry| entry.nodes.node_count())
        .sum();
    assert_eq!(session.pool().outstanding(), displayed_nodes);
    for entry in session.buffer().iter() {
        assert_eq!(
            entry.nodes.author.style("color"),
            entry.item.display_color.map(|c| c.to_string()).as_deref()
        );
    }
}

#[test]
fn test_dedup_window_bounded_over_six_hundred_ids() {
    let mut session = shown_session(Limits::default());
    for chunk in 0..6 {
        let start = chunk * 100 + 1;
        feed(&mut session, snapshot(start..=start + 99));
        assert!(session.dedup().len() <= 500);
    }
    assert_eq!(session.dedup().len(), 500);
    assert!(!session.dedup().is_seen("m1"));
    assert!(!session.dedup().is_seen("m100"));
    assert!(session.dedup().is_seen("m101"));
    assert!(session.dedup().is_seen("m600"));
    assert_eq!(session.buffer().ids().collect::<Vec<_>>(), ids(501..=600));
}

#[test]
fn test_roles_and_colors() {
    let mut session = shown_session(Limits::default());
    feed(
        &mut session,
        vec![
            RawEvent::new("a", "Alice"),
            RawEvent::new("b", "Bob").with_marker(RoleMarker::Member),
            RawEvent::new("c", "Carol").with_marker(RoleMarker::Moderator),
            RawEvent::new("d", "Dave")
                .with_marker(RoleMarker::Moderator)
                .with_marker(RoleMarker::Member),
            RawEvent::new("e", "Alice"),
        ],
    );
    let entries: Vec<_> = session.buffer().iter().collect();
    assert_eq!(
        entries[1].nodes.author.attribute("class"),
        Some("chat-message-author author-member")
    );
    assert_eq!(
        entries[2].nodes.author.attribute("class"),
        Some("chat-message-author author-moderator")
    );
    assert_eq!(
        entries[3].nodes.author.attribute("class"),
        Some("chat-message-author author-member")
    );
    assert!(entries[1].item.display_color.is_none());
    assert_eq!(entries[1].nodes.author.style("color"), Some("#2ba640"));
    assert_eq!(entries[2].nodes.author.style("color"), Some("#5e84f1"));
    assert_eq!(entries[3].nodes.author.style("color"), Some("#2ba640"));
    assert_eq!(entries[0].item.display_color, entries[4].item.display_color);
    assert_eq!(
        entries[0].item.display_color,
        Some(chat_overlay::assign_color("Alice"))
    );
}

#[test]
fn test_hostile_text_stays_text() {
    let mut session = shown_session(Limits::default());
    feed(
        &mut session,
        vec![
            RawEvent::new("x", "<img src=x onerror=alert(1)>")
                .with_content(vec![ContentNode::text("<script>alert(1)</script>")]),
        ],
    );
    let entry = session.buffer().iter().next().expect("entry");
    assert_eq!(entry.nodes.author.text(), "<img src=x onerror=alert(1)>");
    assert_eq!(entry.nodes.runs[0].text(), "<script>alert(1)</script>");
    assert!(entry.nodes.author.listeners().is_empty());
}

#[test]
fn test_visibility_persisted_in_sqlite() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("prefs.db");
    let now = Instant::now();

    {
        let store = SqlitePersistence::open(&db_path).expect("Failed to open store");
        let mut session: Session<SqlitePersistence> = OverlaySession::new(
            ScriptedSource::new(),
            MemorySink::default(),
            store,
            Limits::default(),
        )
        .expect("Failed to create session");
        session.toggle(now).expect("toggle failed");
        assert!(session.preferences().overlay_visible);
    }

    let store = SqlitePersistence::open(&db_path).expect("Failed to reopen store");
    assert_eq!(
        store.get("youtubeOverlayVisible").expect("get failed"),
        Some("true".to_string())
    );

    let mut source = ScriptedSource::new();
    source.push_snapshot(snapshot(1..=3));
    let mut session: Session<SqlitePersistence> =
        OverlaySession::new(source, MemorySink::default(), store, Limits::default())
            .expect("Failed to create session");
    // Saved visibility is honored when fullscreen is entered.
    let report = session.set_fullscreen(true, now).expect("activation cycle");
    assert_eq!(report.appended, 3);
}

mod property_tests {
    use super::*;
    use chat_overlay::ingest::DedupWindow;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn buffer_never_exceeds_capacity(
            max_messages in 1usize..20,
            max_new in 1usize..30,
            snapshots in prop::collection::vec(
                prop::option::of(prop::collection::vec(0usize..60, 0..40)),
                1..12,
            ),
        ) {
            let limits = Limits {
                max_messages,
                max_new_per_cycle: max_new,
                max_processed_ids: 25,
                ..Limits::default()
            };
            let mut session = shown_session(limits);
            for snap in snapshots {
                let poll = snap.map_or(Poll::Unavailable, |ids| {
                    Poll::Ready(ids.into_iter().map(|i| event(&format!("m{i}"))).collect())
                });
                session.source_mut().set(poll);
                session.run_cycle();

                prop_assert!(session.buffer().len() <= max_messages);
                prop_assert_eq!(session.sink().len(), session.buffer().len());
                prop_assert!(session.dedup().len() <= 25);
                let nodes: usize = session.buffer().iter().map(|e| e.nodes.node_count()).sum();
                prop_assert_eq!(session.pool().outstanding(), nodes);
            }
        }

        #[test]
        fn mark_seen_is_idempotent(ids in prop::collection::vec("[a-z0-9]{1,8}", 0..200)) {
            let mut once = DedupWindow::new(500, 0.2);
            let mut twice = DedupWindow::new(500, 0.2);
            for id in &ids {
                once.mark_seen(id.as_str());
                twice.mark_seen(id.as_str());
                twice.mark_seen(id.as_str());
            }
            prop_assert_eq!(once.len(), twice.len());
            for id in &ids {
                prop_assert!(twice.is_seen(id));
            }
        }
    }
}

/// CLI integration tests against the built binary.
mod cli_tests {
    use assert_cmd::prelude::*;
    use predicates::prelude::*;
    use std::process::Command;
    use tempfile::TempDir;

    fn chat_overlay(temp: &TempDir) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("chat-overlay"));
        cmd.env_remove("RUST_LOG")
            .env("CHAT_OVERLAY_DB", temp.path().join("prefs.db"));
        cmd
    }

    #[test]
    fn test_color_command() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        chat_overlay(&temp)
            .args(["color", "Alice", "Bob"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Alice"))
            .stdout(predicate::str::contains("hsl("));
    }

    #[test]
    fn test_prefs_set_and_get() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        chat_overlay(&temp)
            .args(["prefs", "chatColorizeEnabled", "false"])
            .assert()
            .success();
        chat_overlay(&temp)
            .args(["prefs", "chatColorizeEnabled"])
            .assert()
            .success()
            .stdout("false\n");
    }

    #[test]
    fn test_prefs_invalid_value_json_error() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        chat_overlay(&temp)
            .args(["--format", "json", "prefs", "chatAvatarsEnabled", "maybe"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("\"success\": false"))
            .stdout(predicate::str::contains("invalid value for chatAvatarsEnabled"));
    }

    #[test]
    fn test_replay_command() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let capture = temp.path().join("capture.json");
        std::fs::write(
            &capture,
            r#"[
                {"at_ms": 0, "events": null},
                {"at_ms": 400, "events": [
                    {"id": "m1", "author_name": "Alice", "content": [{"kind": "text", "text": "first"}]},
                    {"id": "", "author_name": "Ghost"}
                ]},
                {"at_ms": 2000, "events": [
                    {"id": "m2", "author_name": "Bob", "role_markers": ["moderator"],
                     "content": [{"kind": "text", "text": "second "},
                                 {"kind": "image", "src": "https://e/wave.png", "alt": ":wave:"}]}
                ]}
            ]"#,
        )
        .expect("Failed to write capture");

        chat_overlay(&temp)
            .arg("replay")
            .arg(&capture)
            .assert()
            .success()
            .stdout(predicate::str::contains("Alice: first"))
            .stdout(predicate::str::contains("Bob: second :wave:"))
            .stdout(predicate::str::contains("Malformed:     1"));
    }

    #[test]
    fn test_replay_missing_capture() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        chat_overlay(&temp)
            .args(["replay", "/no/such/capture.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to read"));
    }

    #[test]
    fn test_watch_single_cycle() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let snapshot = temp.path().join("chat.json");
        std::fs::write(
            &snapshot,
            r#"[{"id": "m1", "author_name": "Alice", "content": [{"kind": "text", "text": "live"}]}]"#,
        )
        .expect("Failed to write snapshot");

        chat_overlay(&temp)
            .arg("watch")
            .arg(&snapshot)
            .args(["--max-cycles", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Alice: live"))
            .stdout(predicate::str::contains("Stopped after 1 cycles"));
    }

    #[test]
    fn test_watch_keeps_good_events_beside_bad_ones() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let snapshot = temp.path().join("chat.json");
        std::fs::write(
            &snapshot,
            r#"[
                {"id": "m1", "author_name": "Alice", "content": [{"kind": "text", "text": "live"}]},
                {"id": "m2", "author_name": "Mallory", "content": [{"kind": "text"}]},
                {"id": "m3", "author_name": "Carol", "content": [{"kind": "sticker", "pack": 7}]}
            ]"#,
        )
        .expect("Failed to write snapshot");

        chat_overlay(&temp)
            .arg("watch")
            .arg(&snapshot)
            .args(["--max-cycles", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Alice: live"))
            .stdout(predicate::str::contains(r#"Carol: {"kind":"sticker","pack":7}"#))
            .stdout(predicate::str::contains("Mallory").not())
            .stdout(predicate::str::contains("Stopped after 1 cycles: 2 appended"));
    }
}
