//! CLI layer.
//!
//! Provides the command-line interface using clap: replaying captures,
//! following a live snapshot, showing name colors and managing
//! preferences.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
