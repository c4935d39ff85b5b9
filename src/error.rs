//! Error types for chat overlay operations.
//!
//! The pipeline itself never fails a poll cycle: an unavailable source is a
//! normal [`crate::source::Poll`] outcome and malformed events are skipped.
//! These types cover the fallible edges around it: preference storage,
//! event source files, per-event extraction, and CLI commands.

use thiserror::Error;

/// Result type alias for chat overlay operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Preference storage errors.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Event source errors (capture files, snapshot files).
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Errors raised by a [`crate::settings::Persistence`] backend.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Database(String),

    /// Schema migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Unknown preference key.
    #[error("unknown preference: {key}")]
    UnknownKey {
        /// Key that was not recognized.
        key: String,
    },

    /// Preference value could not be parsed.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Preference key.
        key: String,
        /// Rejected value.
        value: String,
    },
}

/// Errors raised while loading recorded or live event data.
#[derive(Error, Debug)]
pub enum SourceError {
    /// File could not be read.
    #[error("failed to read {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// File contents are not a valid capture.
    #[error("invalid capture: {0}")]
    InvalidCapture(String),
}

/// A single raw event could not be turned into a render item.
///
/// Extraction errors are isolated to the failing event; the surrounding
/// poll cycle logs them and continues, so they never reach [`Error`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The event carries no usable id, so it cannot be deduplicated.
    #[error("event has no id")]
    MissingId,

    /// An image content node has no source reference.
    #[error("image node {index} has an empty source")]
    EmptyImageSource {
        /// Position of the offending node in the content sequence.
        index: usize,
    },
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Command(CommandError::ExecutionFailed(err.to_string()))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Settings(SettingsError::Database(err.to_string()))
    }
}

impl From<rusqlite::Error> for SettingsError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidCapture(err.to_string())
    }
}
