//! Error conversion utilities for CLI.
//!
//! Converts fnpack-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use fnpack_core::PackError;

/// Converts `PackError` to a user-friendly anyhow error with a hint where one
/// helps.
pub fn convert_pack_error(err: PackError) -> anyhow::Error {
    match err {
        PackError::SourceNotFound { path } => {
            anyhow!(
                "Source '{}' does not exist\n\
                 HINT: Pass the function directory with --src.",
                path.display()
            )
        }
        PackError::Walk { path, source } => {
            anyhow!(
                "Failed to walk '{}': {}\n\
                 HINT: Check directory permissions. Use --symlink to store links \
                 instead of following them if there is a link loop.",
                path.display(),
                source
            )
        }
        PackError::Read { path, source } => {
            anyhow!(
                "Cannot read '{}': {}\n\
                 HINT: Fix the file permissions or exclude it with -x.",
                path.display(),
                source
            )
        }
        PackError::InvalidArchive { path, reason } => {
            anyhow!(
                "Invalid zip archive '{}': {}\n\
                 HINT: The archive may be corrupted or truncated. Rebuild it from source.",
                path.display(),
                reason
            )
        }
        PackError::ExcludeFile { path, source } => {
            anyhow!(
                "Cannot read exclude file '{}': {}\n\
                 HINT: Use --exclude-file to point at a readable file.",
                path.display(),
                source
            )
        }
        PackError::Destination { path, source } => {
            anyhow!(
                "Cannot write artifact to '{}': {}\n\
                 HINT: Check that the parent directory exists and is writable.",
                path.display(),
                source
            )
        }
        PackError::TempFile(source) => {
            anyhow!(
                "Cannot create temporary archive file: {source}\n\
                 HINT: Check that TMPDIR points at a writable directory with free space."
            )
        }
        _ => anyhow::Error::from(err).context("Failed to package function"),
    }
}

/// Maps a core result into an anyhow result with a hint.
pub fn add_pack_context<T>(result: Result<T, PackError>) -> anyhow::Result<T> {
    result.map_err(convert_pack_error)
}
