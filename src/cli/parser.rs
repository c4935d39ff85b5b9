//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// chat-overlay: a bounded live chat overlay pipeline.
///
/// Replays recorded chat captures, follows a live snapshot file, and
/// manages display preferences.
#[derive(Parser, Debug)]
#[command(name = "chat-overlay")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the preference database.
    ///
    /// Defaults to `.chat-overlay/prefs.db` in the current directory.
    #[arg(short, long, env = "CHAT_OVERLAY_DB", global = true)]
    pub db_path: Option<PathBuf>,

    /// Enable verbose (debug) logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a recorded capture through the pipeline.
    ///
    /// Polls are applied at their recorded offsets using a simulated
    /// clock, then the final display is printed.
    Replay {
        /// Path to the capture file.
        capture: PathBuf,

        /// Maximum messages kept on screen.
        #[arg(long)]
        max_messages: Option<usize>,

        /// Print every cycle report, not just the summary.
        #[arg(long)]
        cycles: bool,
    },

    /// Follow a snapshot file that another process keeps rewriting.
    ///
    /// Prints each message as it is appended. Stops on Ctrl-C.
    Watch {
        /// Path to the snapshot file (JSON array of events).
        snapshot: PathBuf,

        /// Stop after this many cycles.
        #[arg(long)]
        max_cycles: Option<u64>,
    },

    /// Show the color assigned to author names.
    Color {
        /// Author names.
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Show or change preferences.
    ///
    /// With no key, lists every preference. With a key, prints it. With a
    /// key and a value, stores the value.
    Prefs {
        /// Preference key (e.g. `chatAvatarsEnabled`).
        key: Option<String>,

        /// New value (true/false, on/off, 1/0).
        value: Option<String>,
    },
}

impl Cli {
    /// Returns the database path, using the default if not specified.
    #[must_use]
    pub fn get_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::settings::DEFAULT_DB_PATH))
    }
}
