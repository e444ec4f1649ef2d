//! Error types for dirsort.
//!
//! Errors come in two tiers. [`OrganizeError`] is fatal and is always raised
//! before anything on disk is touched. [`MoveError`] belongs to a single
//! planned move; it is recorded in the execution report and the batch carries
//! on.

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for fatal organizer operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Fatal errors that stop a run before any file is moved.
#[derive(Error, Debug)]
pub enum OrganizeError {
    #[error("Target directory not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Target path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Error reading directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Per-file failures recorded by the executor.
#[derive(Error, Debug)]
pub enum MoveError {
    /// The category folder could not be created. Every move into that
    /// folder fails with the same reason.
    #[error("Failed to create folder {}: {reason}", .folder.display())]
    FolderCreate { folder: PathBuf, reason: String },

    #[error("Source file no longer exists: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("Destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("Failed to move file: {source}")]
    Move {
        #[source]
        source: std::io::Error,
    },

    /// Cross-filesystem fallback failed; the source was left in place.
    #[error("Failed to copy file across filesystems: {source}")]
    CopyFallback {
        #[source]
        source: std::io::Error,
    },

    /// A file that occupied a category folder name was moved aside, its
    /// move failed, and it could not be renamed back.
    #[error("File left at {}: {reason}", .temp.display())]
    Stranded { temp: PathBuf, reason: String },
}
