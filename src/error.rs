//! Error types for paneweave.
//!
//! All errors in paneweave are represented by [`PaneweaveError`], which covers
//! session file loading, parameter overrides, window conditions, and tmux failures.

use std::path::PathBuf;
use thiserror::Error;

/// All possible errors that can occur in paneweave.
#[derive(Error, Debug)]
pub enum PaneweaveError {
    /// Session file does not exist at the expected path.
    #[error("Session file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// Could not determine the user's config directory.
    #[error("Could not determine config directory")]
    NoConfigDir,

    /// Failed to read a file from disk.
    #[error("Failed to read session file: {0}")]
    IoError(#[from] std::io::Error),

    /// The session document is not valid YAML/TOML or has an unusable shape.
    #[error("Failed to load session file {path}: {message}")]
    LoadFailure {
        /// File the document was read from (`<memory>` for inline text).
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A resolution stage ran before any document was loaded.
    #[error("{0} was called without a session document loaded")]
    NotLoaded(&'static str),

    /// A runtime override entry is not exactly one `key=value` pair.
    #[error("Invalid parameter override '{0}' (expected key=value)")]
    InvalidOverrideFormat(String),

    /// An `unless` condition names a parameter that was never defined.
    #[error("Window '{window}' has an unless condition on unknown parameter '{parameter}'")]
    ConditionLookupFailure {
        /// Window carrying the condition.
        window: String,
        /// Parameter that could not be found.
        parameter: String,
    },

    /// A window entry does not match the expected structure.
    #[error("Invalid window '{window}': {message}")]
    InvalidWindow {
        /// Window name, or its position when the name is missing.
        window: String,
        /// What is wrong with it.
        message: String,
    },

    /// A tmux command failed to execute.
    #[error("Tmux error: {0}")]
    TmuxError(String),

    /// Command was run outside of a tmux session.
    #[error("Not running inside tmux (use --session-name to start a new session)")]
    NotInTmux,
}

/// Convenient Result type alias for paneweave operations.
pub type Result<T> = std::result::Result<T, PaneweaveError>;
