//! Error conversion utilities for CLI.
//!
//! Converts filearc-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use filearc_core::ArchiveError;
use std::path::Path;

/// Converts `ArchiveError` to user-friendly anyhow error with context
pub fn convert_archive_error(err: ArchiveError, archive: &Path) -> anyhow::Error {
    match err {
        ArchiveError::SourceNotFound { path } => {
            anyhow!(
                "Source path not found: {}\n\
                 HINT: Check the SOURCE argument; it must be an existing file or directory.",
                path.display()
            )
        }
        ArchiveError::AppendNotSupported { path, reason } => {
            anyhow!(
                "Cannot append to '{}': {}\n\
                 HINT: Only uncompressed tar archives can be appended to. Create a new archive instead.",
                path.display(),
                reason
            )
        }
        ArchiveError::Bzip2WriteNotSupported => {
            anyhow!(
                "Cannot create '{}': bzip2 compression is supported for reading only\n\
                 HINT: Use --compression gzip or --compression none.",
                archive.display()
            )
        }
        ArchiveError::UnsupportedFormat { reason } => {
            anyhow!(
                "Archive format not supported for '{}': {}\n\
                 HINT: Supported formats: tar, tar.gz, tar.bz2 (read only), zip",
                archive.display(),
                reason
            )
        }
        ArchiveError::NotFound { name } => {
            anyhow!(
                "Entry '{}' not found in '{}'\n\
                 HINT: Use 'filearc list {}' to see the archived paths.",
                name,
                archive.display(),
                archive.display()
            )
        }
        ArchiveError::UnsupportedType { name, kind } => {
            anyhow!(
                "Cannot extract '{}' from '{}': {} entries are not supported\n\
                 HINT: Use --filter to extract only regular files, directories and symlinks.",
                name,
                archive.display(),
                kind
            )
        }
        ArchiveError::Io(io_err) => {
            anyhow!(
                "I/O error while processing '{}': {}",
                archive.display(),
                io_err
            )
        }
        ArchiveError::InvalidArchive(reason) => {
            anyhow!(
                "Invalid archive '{}': {}\n\
                 HINT: The archive may be corrupted or truncated.",
                archive.display(),
                reason
            )
        }
    }
}

/// Adds context to a generic error about archive operations
pub fn add_archive_context<T>(
    result: Result<T, ArchiveError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_archive_error(e, archive))
}
