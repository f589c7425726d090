//! # Error Module
//!
//! Error types for the duplicate image finder.
//!
//! ## Propagation
//! - Only startup problems (bad root directory, bad parameters) surface as
//!   failures of a run
//! - Per-file and per-pair problems are contained: a file that cannot be read
//!   contributes nothing, a pair that cannot be decoded is not a match
//! - Action failures are reported per pair and never stop the dispatch loop

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Top-level application error.
///
/// Attribute and decode failures have no variant here: the comparators turn
/// them into "no match" and they never end a run.
#[derive(Error, Debug)]
pub enum DedupError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Action error: {0}")]
    Action(#[from] ActionError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while enumerating files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    ReadEntry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while deriving a cached file attribute
#[derive(Error, Debug)]
pub enum AttributeError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while decoding an image into a histogram signature
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to open image file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported image format: {path}")]
    Unsupported { path: PathBuf },

    #[error("Failed to decode image {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Image has no pixels: {path}")]
    EmptyImage { path: PathBuf },
}

/// Errors that occur while setting up the pairwise search
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),
}

/// Errors that occur while applying an action to a matched pair
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch viewer '{program}': {source}")]
    ViewerLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Viewer '{program}' exited with {status}")]
    ViewerFailed { program: String, status: ExitStatus },

    #[error("Viewer command is empty")]
    EmptyViewer,
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DedupError>;
