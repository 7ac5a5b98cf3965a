//! Error types for artifact packaging operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `PackError`.
pub type Result<T> = std::result::Result<T, PackError>;

/// Errors that can occur while building, loading, or shipping an artifact.
///
/// Every variant that concerns a specific file carries its path so callers
/// can report a precise diagnostic without re-deriving context.
#[derive(Error, Debug)]
pub enum PackError {
    /// Source path given to the builder does not exist.
    #[error("source not found: {path}")]
    SourceNotFound {
        /// The missing source path.
        path: PathBuf,
    },

    /// Directory traversal failed (unreadable directory, symlink loop, ...).
    #[error("failed to walk {path}: {source}")]
    Walk {
        /// Path being visited when the walk failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A source file could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The source file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An entry could not be written into the archive.
    #[error("failed to write {name} into archive: {reason}")]
    Write {
        /// Entry name inside the archive.
        name: String,
        /// Description of the failure.
        reason: String,
    },

    /// The temporary archive sink could not be created or accessed.
    #[error("failed to open temporary archive file: {0}")]
    TempFile(#[source] std::io::Error),

    /// Writing the central directory failed.
    #[error("failed to finalize zip archive: {0}")]
    Finalize(String),

    /// File is not a well-formed zip archive.
    #[error("invalid zip archive {path}: {reason}")]
    InvalidArchive {
        /// The archive that failed to open.
        path: PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// Exclude file exists but could not be read.
    #[error("failed to read exclude file {path}: {source}")]
    ExcludeFile {
        /// The exclude file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Compression level outside 1-9.
    #[error("invalid compression level {level} (expected 1-9)")]
    InvalidCompressionLevel {
        /// The rejected level.
        level: u8,
    },

    /// The artifact could not be written to its destination.
    #[error("failed to write artifact to {path}: {source}")]
    Destination {
        /// Destination path (`-` for stdout).
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The upload sink rejected the artifact.
    #[error("failed to upload to {target}: {reason}")]
    Upload {
        /// Target locator (`bucket/key`).
        target: String,
        /// Description of the failure.
        reason: String,
    },

    /// Build was cancelled between entries.
    #[error("archive build cancelled")]
    Cancelled,

    /// Generic I/O failure not tied to a specific source path.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PackError {
    /// Returns the filesystem path this error concerns, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use fnpack_core::PackError;
    /// use std::path::{Path, PathBuf};
    ///
    /// let err = PackError::SourceNotFound {
    ///     path: PathBuf::from("missing"),
    /// };
    /// assert_eq!(err.path(), Some(Path::new("missing")));
    /// assert_eq!(PackError::Cancelled.path(), None);
    /// ```
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::SourceNotFound { path }
            | Self::Walk { path, .. }
            | Self::Read { path, .. }
            | Self::InvalidArchive { path, .. }
            | Self::ExcludeFile { path, .. }
            | Self::Destination { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Returns `true` if the error came from a malformed archive on the read
    /// path.
    #[must_use]
    pub const fn is_malformed_archive(&self) -> bool {
        matches!(self, Self::InvalidArchive { .. })
    }
}
