//! Archive entry type enumeration.

use std::path::PathBuf;

/// Type of entry in an archive.
///
/// # Examples
///
/// ```
/// use filearc_core::EntryType;
/// use std::path::PathBuf;
///
/// let file = EntryType::File;
/// let symlink = EntryType::Symlink {
///     target: PathBuf::from("../target"),
/// };
/// assert!(file.is_file());
/// assert_eq!(symlink.kind_name(), "symlink");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// Regular file entry.
    File,

    /// Directory entry.
    Directory,

    /// Symbolic link entry.
    ///
    /// The target is stored exactly as recorded in the archive.
    Symlink {
        /// The symlink target path.
        target: PathBuf,
    },

    /// Any other kind the container can record (hard links, device nodes,
    /// FIFOs, sparse files). Listed, but never materialized on extraction.
    Unsupported {
        /// Human-readable kind, e.g. `"character device"`.
        kind: &'static str,
    },
}

impl EntryType {
    /// Returns `true` if this is a regular file.
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self, Self::File)
    }

    /// Returns `true` if this is a directory.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        matches!(self, Self::Directory)
    }

    /// Returns `true` if this is a symlink.
    #[must_use]
    pub const fn is_symlink(&self) -> bool {
        matches!(self, Self::Symlink { .. })
    }

    /// Returns the symlink target, if this is a symlink.
    #[must_use]
    pub fn link_target(&self) -> Option<&std::path::Path> {
        match self {
            Self::Symlink { target } => Some(target),
            _ => None,
        }
    }

    /// Short name of the kind, used in listings and error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink { .. } => "symlink",
            Self::Unsupported { kind } => *kind,
        }
    }
}
