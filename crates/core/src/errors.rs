//! Error types for the inimerge core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type.
//!
//! Malformed document *content* is never an error: the parser degrades to
//! capturing fewer settings. Only I/O failures and broken engine invariants
//! surface here.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Source errors
// ---------------------------------------------------------------------------

/// Errors reading a single source document.
///
/// These are per-file and recoverable: the failing file is skipped and the
/// remaining sources still take part in the merge.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file does not exist.
    #[error("source file not found: {0}")]
    NotFound(PathBuf),

    /// The file exists but could not be read.
    #[error("failed to read source file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid UTF-8 text.
    #[error("source file '{0}' is not valid UTF-8 text")]
    NotUtf8(PathBuf),
}

impl SourceError {
    /// The path of the file that failed to load.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::NotFound(path) | Self::NotUtf8(path) => path,
            Self::Io { path, .. } => path,
        }
    }
}

// ---------------------------------------------------------------------------
// Merge session errors
// ---------------------------------------------------------------------------

/// Errors from the merge session state machine.
#[derive(Debug, Error)]
pub enum MergeError {
    /// A merge was requested with no source documents.
    #[error("no source files to merge")]
    NoSources,

    /// The requested operation is not valid in the session's current phase.
    #[error("operation requires phase '{expected}', session is '{actual}'")]
    InvalidPhase { expected: String, actual: String },

    /// The chosen option does not exist on the current conflict.
    #[error("option {index} out of range: conflict has {available} options")]
    OptionOutOfRange { index: usize, available: usize },

    /// The engine produced an inconsistent state. The session moves to
    /// `Failed` and must be reset.
    #[error("internal merge failure: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// Output errors
// ---------------------------------------------------------------------------

/// Errors writing the merged document.
///
/// Recoverable: the merged text stays available in memory for a retry.
#[derive(Debug, Error)]
pub enum OutputError {
    /// No destination path was given.
    #[error("output path must not be empty")]
    EmptyPath,

    /// Writing the destination failed.
    #[error("failed to write merged file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// The configuration could not be rendered as TOML.
    #[error("configuration serialize error: {0}")]
    SerializeError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
