//! Error types for the trophy engine and its console.

use std::io;
use thiserror::Error;

/// Main error type for the crate.
///
/// The engine itself never returns these to its callers: storage failures are
/// logged and swallowed. They surface from the store implementations, the
/// console parser and the binary.
#[derive(Error, Debug)]
pub enum TrophyError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not determine home directory")]
    NoDataDir,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing argument for `{command}`: expected {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("Unknown event: {0}")]
    UnknownEvent(String),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, TrophyError>;
