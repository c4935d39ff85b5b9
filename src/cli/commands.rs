//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use crate::cli::output::{
    CycleTotals, OutputFormat, ReplaySummary, format_colors, format_preference,
    format_preferences, format_replay, format_watch_message, format_watch_summary,
};
use crate::cli::parser::{Cli, Commands};
use crate::config::Limits;
use crate::error::{CommandError, Result};
use crate::identity::assign_color;
use crate::render::{MemorySink, RenderSink, Viewport};
use crate::schedule::{CycleReport, OverlaySession};
use crate::settings::{MemoryPersistence, Persistence, PreferenceKey, Preferences, SqlitePersistence};
use crate::source::{Capture, EventSource, JsonFileSource, ScriptedSource};
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let db_path = cli.get_db_path();

    match &cli.command {
        Commands::Replay {
            capture,
            max_messages,
            cycles,
        } => cmd_replay(&db_path, capture, *max_messages, *cycles, format),
        Commands::Watch {
            snapshot,
            max_cycles,
        } => cmd_watch(&db_path, snapshot, *max_cycles, format),
        Commands::Color { names } => Ok(cmd_color(names, format)),
        Commands::Prefs { key, value } => {
            cmd_prefs(&db_path, key.as_deref(), value.as_deref(), format)
        }
    }
}

/// Loads stored preferences without creating a database that does not
/// exist yet.
fn stored_preferences(db_path: &Path) -> Result<Preferences> {
    if db_path.exists() {
        Preferences::load(&SqlitePersistence::open(db_path)?)
    } else {
        Ok(Preferences::default())
    }
}

/// Builds a shown session over `source` from the stored display
/// preferences. Visibility is forced on in a throwaway store so the user's
/// saved visibility is left alone.
fn open_session<S: EventSource>(
    db_path: &Path,
    source: S,
    limits: Limits,
) -> Result<OverlaySession<S, MemorySink, MemoryPersistence>> {
    let mut prefs = stored_preferences(db_path)?;
    prefs.overlay_visible = true;
    let mut store = MemoryPersistence::new();
    prefs.save(&mut store)?;
    OverlaySession::new(source, MemorySink::default(), store, limits)
}

/// Runs every scheduler deadline strictly before `until`.
fn drive_until<S, K, P>(
    session: &mut OverlaySession<S, K, P>,
    until: Instant,
    reports: &mut Vec<CycleReport>,
) where
    S: EventSource,
    K: RenderSink + Viewport,
    P: Persistence,
{
    while let Some(deadline) = session.next_deadline().filter(|deadline| *deadline < until) {
        reports.extend(session.tick(deadline));
    }
}

// ==================== Command Implementations ====================

fn cmd_replay(
    db_path: &Path,
    capture_path: &Path,
    max_messages: Option<usize>,
    show_cycles: bool,
    format: OutputFormat,
) -> Result<String> {
    let capture = Capture::load(capture_path)?;
    let limits = Limits {
        max_messages: max_messages.unwrap_or(crate::config::MAX_MESSAGES),
        ..Limits::default()
    };
    let flush = limits.poll_interval + limits.debounce;
    let mut session = open_session(db_path, ScriptedSource::new(), limits)?;

    let start = Instant::now();
    let mut reports = Vec::new();
    for poll in &capture.polls {
        let at = start + Duration::from_millis(poll.at_ms);
        drive_until(&mut session, at, &mut reports);
        session.source_mut().set(poll.to_poll());
        if session.is_fullscreen() {
            session.notify_mutation(at);
        } else {
            reports.extend(session.set_fullscreen(true, at));
        }
    }
    let end = start + Duration::from_millis(capture.duration_ms()) + flush;
    drive_until(&mut session, end, &mut reports);

    let mut totals = CycleTotals::default();
    for report in &reports {
        totals.record(report);
    }
    info!(
        polls = capture.polls.len(),
        cycles = totals.cycles,
        "replay finished"
    );

    let summary = ReplaySummary {
        polls: capture.polls.len(),
        totals,
        reports: show_cycles.then_some(reports.as_slice()),
        pool: session.pool().stats(),
        seen_ids: session.dedup().len(),
        messages: session.buffer().iter().map(|entry| &entry.item).collect(),
        lines: session.sink().lines().collect(),
    };
    Ok(format_replay(&summary, format))
}

fn cmd_watch(
    db_path: &Path,
    snapshot: &Path,
    max_cycles: Option<u64>,
    format: OutputFormat,
) -> Result<String> {
    if max_cycles == Some(0) {
        return Err(CommandError::InvalidArgument("--max-cycles must be > 0".to_string()).into());
    }
    let mut session = open_session(db_path, JsonFileSource::new(snapshot), Limits::default())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CommandError::ExecutionFailed(format!("failed to start runtime: {e}")))?;
    let totals = runtime.block_on(watch_loop(&mut session, max_cycles, format))?;

    Ok(format_watch_summary(
        &totals,
        session.buffer().len(),
        format,
    ))
}

async fn watch_loop(
    session: &mut OverlaySession<JsonFileSource, MemorySink, MemoryPersistence>,
    max_cycles: Option<u64>,
    format: OutputFormat,
) -> Result<CycleTotals> {
    let mut totals = CycleTotals::default();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    info!(path = %session.source().path().display(), "watching snapshot");
    let mut report = session.set_fullscreen(true, Instant::now());
    loop {
        if let Some(report) = report.take() {
            totals.record(&report);
            emit_appended(session, &report, format)?;
        }
        if max_cycles.is_some_and(|max| totals.cycles >= max) {
            break;
        }
        let Some(deadline) = session.next_deadline() else {
            break;
        };

        tokio::select! {
            () = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => {
                report = session.tick(Instant::now());
            }
            _ = &mut ctrl_c => {
                info!("interrupted");
                break;
            }
        }
    }
    Ok(totals)
}

/// Writes the messages a cycle appended, oldest first.
fn emit_appended(
    session: &OverlaySession<JsonFileSource, MemorySink, MemoryPersistence>,
    report: &CycleReport,
    format: OutputFormat,
) -> Result<()> {
    let shown = report.appended.min(session.buffer().len());
    let skip = session.buffer().len() - shown;
    let mut stdout = io::stdout().lock();
    for (entry, line) in session
        .buffer()
        .iter()
        .zip(session.sink().lines())
        .skip(skip)
    {
        stdout.write_all(format_watch_message(&entry.item, line, format).as_bytes())?;
    }
    stdout.flush()?;
    Ok(())
}

fn cmd_color(names: &[String], format: OutputFormat) -> String {
    let colors: Vec<_> = names
        .iter()
        .map(|name| (name.clone(), assign_color(name)))
        .collect();
    format_colors(&colors, format)
}

fn cmd_prefs(
    db_path: &Path,
    key: Option<&str>,
    value: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    match (key, value) {
        (None, _) => {
            let prefs = stored_preferences(db_path)?;
            Ok(format_preferences(&prefs, format))
        }
        (Some(key), None) => {
            let key: PreferenceKey = key.parse()?;
            let prefs = stored_preferences(db_path)?;
            Ok(format_preference(key, prefs.get(key), format))
        }
        (Some(key), Some(value)) => {
            let key: PreferenceKey = key.parse()?;
            let value = key.parse_value(value)?;
            let mut store = SqlitePersistence::open(db_path)?;
            let mut prefs = Preferences::load(&store)?;
            prefs.set(key, value);
            prefs.save_key(key, &mut store)?;
            info!(%key, value, "preference stored");
            Ok(format_preference(key, value, format))
        }
    }
}
