//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::core::{HslColor, RenderItem};
use crate::error::Error;
use crate::render::PoolStats;
use crate::schedule::CycleReport;
use crate::settings::{PreferenceKey, Preferences};
use serde::Serialize;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Aggregate counters over a run of cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleTotals {
    /// Cycles run.
    pub cycles: u64,
    /// Cycles where the source was unavailable.
    pub unavailable: u64,
    /// Messages appended.
    pub appended: usize,
    /// Messages evicted.
    pub evicted: usize,
    /// Events skipped as already seen.
    pub already_seen: usize,
    /// Events skipped as malformed.
    pub malformed: usize,
}

impl CycleTotals {
    /// Adds one cycle's counters.
    pub fn record(&mut self, report: &CycleReport) {
        self.cycles += 1;
        if !report.source_available {
            self.unavailable += 1;
        }
        self.appended += report.appended;
        self.evicted += report.evicted;
        self.already_seen += report.already_seen;
        self.malformed += report.malformed;
    }
}

/// Everything `replay` reports.
#[derive(Debug, Serialize)]
pub struct ReplaySummary<'a> {
    /// Recorded polls replayed.
    pub polls: usize,
    /// Counters over every cycle.
    pub totals: CycleTotals,
    /// Per-cycle reports, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reports: Option<&'a [CycleReport]>,
    /// Node pool counters.
    pub pool: PoolStats,
    /// Ids currently remembered as seen.
    pub seen_ids: usize,
    /// Messages on screen at the end, oldest first.
    pub messages: Vec<&'a RenderItem>,
    /// Their rendered lines, oldest first.
    #[serde(skip)]
    pub lines: Vec<&'a str>,
}

/// Formats the result of a replay.
#[must_use]
pub fn format_replay(summary: &ReplaySummary<'_>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_replay_text(summary),
        OutputFormat::Json => format_json(summary),
    }
}

fn format_replay_text(summary: &ReplaySummary<'_>) -> String {
    let mut output = String::new();
    for line in &summary.lines {
        let _ = writeln!(output, "{line}");
    }
    if !summary.lines.is_empty() {
        output.push('\n');
    }

    if let Some(reports) = summary.reports {
        output.push_str("Cycles:\n");
        for report in reports {
            let _ = writeln!(output, "  {}", format_cycle_line(report));
        }
        output.push('\n');
    }

    let totals = &summary.totals;
    output.push_str("Replay Summary\n");
    output.push_str("==============\n\n");
    let _ = writeln!(output, "  Polls:         {}", summary.polls);
    let _ = writeln!(
        output,
        "  Cycles:        {} ({} unavailable)",
        totals.cycles, totals.unavailable
    );
    let _ = writeln!(output, "  Appended:      {}", totals.appended);
    let _ = writeln!(output, "  Evicted:       {}", totals.evicted);
    let _ = writeln!(output, "  Already seen:  {}", totals.already_seen);
    let _ = writeln!(output, "  Malformed:     {}", totals.malformed);
    let _ = writeln!(output, "  Displayed:     {}", summary.messages.len());
    let _ = writeln!(output, "  Seen ids:      {}", summary.seen_ids);
    let _ = writeln!(
        output,
        "  Nodes:         {} created, {} reused, {} trimmed",
        summary.pool.created, summary.pool.reused, summary.pool.trimmed
    );
    output
}

fn format_cycle_line(report: &CycleReport) -> String {
    if !report.source_available {
        return format!("#{} source unavailable", report.cycle);
    }
    format!(
        "#{} polled {} appended {} evicted {} seen {} malformed {}{}",
        report.cycle,
        report.polled,
        report.appended,
        report.evicted,
        report.already_seen,
        report.malformed,
        if report.scrolled { " (followed)" } else { "" }
    )
}

/// Formats one message appended during `watch`.
///
/// JSON output is one compact object per line.
#[must_use]
pub fn format_watch_message(item: &RenderItem, line: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("{line}\n"),
        OutputFormat::Json => {
            let mut json = serde_json::to_string(item).unwrap_or_else(|_| "{}".to_string());
            json.push('\n');
            json
        }
    }
}

/// Formats the closing line of `watch`.
#[must_use]
pub fn format_watch_summary(totals: &CycleTotals, displayed: usize, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!(
            "Stopped after {} cycles: {} appended, {} displayed.\n",
            totals.cycles, totals.appended, displayed
        ),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct WatchSummary<'a> {
                totals: &'a CycleTotals,
                displayed: usize,
            }
            let mut json = serde_json::to_string(&WatchSummary { totals, displayed })
                .unwrap_or_else(|_| "{}".to_string());
            json.push('\n');
            json
        }
    }
}

/// Formats assigned name colors.
#[must_use]
pub fn format_colors(colors: &[(String, HslColor)], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let width = colors.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
            let mut output = String::new();
            for (name, color) in colors {
                let _ = writeln!(output, "{name:<width$}  {color}");
            }
            output
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct NamedColor<'a> {
                name: &'a str,
                css: String,
                #[serde(flatten)]
                color: HslColor,
            }
            let entries: Vec<_> = colors
                .iter()
                .map(|(name, color)| NamedColor {
                    name,
                    css: color.to_string(),
                    color: *color,
                })
                .collect();
            format_json(&entries)
        }
    }
}

/// Formats the full preference set.
#[must_use]
pub fn format_preferences(prefs: &Preferences, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = String::new();
            for key in PreferenceKey::ALL {
                let _ = writeln!(output, "{:<24}{}", key.as_str(), prefs.get(key));
            }
            output
        }
        OutputFormat::Json => {
            let map: serde_json::Map<String, serde_json::Value> = PreferenceKey::ALL
                .into_iter()
                .map(|key| (key.as_str().to_string(), prefs.get(key).into()))
                .collect();
            format_json(&map)
        }
    }
}

/// Formats a single preference.
#[must_use]
pub fn format_preference(key: PreferenceKey, value: bool, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("{value}\n"),
        OutputFormat::Json => {
            let mut map = serde_json::Map::new();
            map.insert(key.as_str().to_string(), value.into());
            format_json(&map)
        }
    }
}

/// Formats an error for display.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => format_json(&serde_json::json!({
            "success": false,
            "error": error.to_string(),
        })),
    }
}

fn format_json<T: Serialize>(value: &T) -> String {
    let mut json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    json.push('\n');
    json
}
