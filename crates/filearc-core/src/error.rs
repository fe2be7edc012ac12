//! Error types for archive operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ArchiveError`.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Errors that can occur while creating, reading or extracting archives.
///
/// End of archive is never reported through this type: entry cursors return
/// `Ok(None)` when the container is exhausted.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive is corrupted or its framing cannot be decoded.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// Requested combination of container and compression is not supported.
    #[error("unsupported archive format: {reason}")]
    UnsupportedFormat {
        /// Why the format was rejected.
        reason: String,
    },

    /// Source path given for archiving does not exist.
    #[error("source path not found: {path}")]
    SourceNotFound {
        /// The missing source path.
        path: PathBuf,
    },

    /// Append was requested on an archive that cannot be appended to.
    #[error("append not supported for {path}: {reason}")]
    AppendNotSupported {
        /// The archive path.
        path: PathBuf,
        /// Why the archive cannot be appended to.
        reason: String,
    },

    /// Bzip2 can be decoded but not encoded.
    #[error("bzip2 compression is supported for reading only")]
    Bzip2WriteNotSupported,

    /// Requested entry does not exist in the archive.
    #[error("entry not found in archive: {name}")]
    NotFound {
        /// The requested entry name or prefix.
        name: String,
    },

    /// Entry kind cannot be materialized on disk.
    #[error("unsupported entry type '{kind}' for {name}")]
    UnsupportedType {
        /// The entry name.
        name: String,
        /// Human-readable entry kind.
        kind: String,
    },
}

impl ArchiveError {
    /// Returns `true` if the operation was refused by policy rather than
    /// failing on I/O or corrupt data.
    ///
    /// # Examples
    ///
    /// ```
    /// use filearc_core::ArchiveError;
    ///
    /// assert!(ArchiveError::Bzip2WriteNotSupported.is_policy_error());
    ///
    /// let err = ArchiveError::InvalidArchive("truncated header".to_string());
    /// assert!(!err.is_policy_error());
    /// ```
    #[must_use]
    pub const fn is_policy_error(&self) -> bool {
        matches!(
            self,
            Self::AppendNotSupported { .. } | Self::Bzip2WriteNotSupported
        )
    }

    /// Returns `true` if a requested entry or prefix was not found.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns a context string for this error, if available.
    ///
    /// # Examples
    ///
    /// ```
    /// use filearc_core::ArchiveError;
    ///
    /// let err = ArchiveError::InvalidArchive("bad header".to_string());
    /// assert_eq!(err.context(), Some("bad header"));
    ///
    /// assert_eq!(ArchiveError::Bzip2WriteNotSupported.context(), None);
    /// ```
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::InvalidArchive(msg) => Some(msg),
            Self::UnsupportedFormat { reason } | Self::AppendNotSupported { reason, .. } => {
                Some(reason)
            }
            _ => None,
        }
    }
}

/// Converts a zip crate error, keeping I/O failures as I/O errors.
pub(crate) fn zip_error(err: zip::result::ZipError) -> ArchiveError {
    match err {
        zip::result::ZipError::Io(io_err) => ArchiveError::Io(io_err),
        other => ArchiveError::InvalidArchive(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ArchiveError::Bzip2WriteNotSupported;
        assert_eq!(
            err.to_string(),
            "bzip2 compression is supported for reading only"
        );
    }

    #[test]
    fn test_not_found_error() {
        let err = ArchiveError::NotFound {
            name: "missing.txt".into(),
        };
        assert!(err.to_string().contains("missing.txt"));
        assert!(err.is_not_found());
        assert!(!err.is_policy_error());
    }

    #[test]
    fn test_append_not_supported_error() {
        let err = ArchiveError::AppendNotSupported {
            path: PathBuf::from("out.tar.gz"),
            reason: "archive is gzip-compressed".into(),
        };
        let display = err.to_string();
        assert!(display.contains("out.tar.gz"));
        assert!(display.contains("gzip"));
        assert!(err.is_policy_error());
        assert_eq!(err.context(), Some("archive is gzip-compressed"));
    }

    #[test]
    fn test_unsupported_type_error() {
        let err = ArchiveError::UnsupportedType {
            name: "dev/null".into(),
            kind: "character device".into(),
        };
        let display = err.to_string();
        assert!(display.contains("character device"));
        assert!(display.contains("dev/null"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ArchiveError = io_err.into();
        assert!(matches!(err, ArchiveError::Io(_)));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_zip_error_conversion() {
        let io_err = std::io::Error::other("disk gone");
        let err = zip_error(zip::result::ZipError::Io(io_err));
        assert!(matches!(err, ArchiveError::Io(_)));

        let err = zip_error(zip::result::ZipError::InvalidArchive("bad cde".into()));
        assert!(matches!(err, ArchiveError::InvalidArchive(_)));
    }
}
