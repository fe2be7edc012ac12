//! Archive entry metadata and entry name handling.

use std::path::MAIN_SEPARATOR;
use std::path::PathBuf;
use std::time::SystemTime;

use super::EntryType;

/// A single file-system object recorded in, or read from, a container.
///
/// Names are POSIX-style relative paths: `/` separated, no leading `./`
/// and no trailing `/`, whatever the container stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Normalized entry name. Never empty for entries read from an archive;
    /// the archive root (`./`) is not reported as an entry.
    pub name: String,

    /// Kind of entry, including the link target for symlinks.
    pub entry_type: EntryType,

    /// Uncompressed content size in bytes (0 for directories and links).
    pub size: u64,

    /// Unix permission bits, when the container records them.
    pub mode: Option<u32>,

    /// Modification time, when the container records it.
    pub modified: Option<SystemTime>,

    /// Decode cursor: data offset within the decompressed tar stream, or
    /// local header offset within a zip file. Zero for entries that were
    /// never read from a container.
    pub offset: u64,
}

impl ArchiveEntry {
    /// Creates an entry with the given name and type and no metadata.
    ///
    /// The name is normalized with [`normalize_entry_name`].
    ///
    /// # Examples
    ///
    /// ```
    /// use filearc_core::ArchiveEntry;
    /// use filearc_core::EntryType;
    ///
    /// let entry = ArchiveEntry::new("./docs/", EntryType::Directory);
    /// assert_eq!(entry.name, "docs");
    /// ```
    pub fn new(name: &str, entry_type: EntryType) -> Self {
        Self {
            name: normalize_entry_name(name),
            entry_type,
            size: 0,
            mode: None,
            modified: None,
            offset: 0,
        }
    }

    /// Sets the content size.
    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Sets the permission bits.
    #[must_use]
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Sets the modification time.
    #[must_use]
    pub fn with_modified(mut self, modified: SystemTime) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Returns the last path segment of the name.
    #[must_use]
    pub fn base_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// Normalizes a stored entry name.
///
/// Drops empty and `.` segments, which removes leading `./`, leading `/`,
/// doubled separators and trailing `/`. `..` segments are preserved so that
/// containment checks can see them.
///
/// # Examples
///
/// ```
/// use filearc_core::types::normalize_entry_name;
///
/// assert_eq!(normalize_entry_name("./c/c1.txt"), "c/c1.txt");
/// assert_eq!(normalize_entry_name("c/"), "c");
/// assert_eq!(normalize_entry_name("/abs//path"), "abs/path");
/// assert_eq!(normalize_entry_name("a/../b"), "a/../b");
/// ```
#[must_use]
pub fn normalize_entry_name(name: &str) -> String {
    name.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolves `..` segments lexically and returns the relative path the entry
/// names, or `None` if it climbs above the archive root.
///
/// Both `/` and the platform separator delimit segments, so a name can never
/// smuggle a separator past the check.
///
/// # Examples
///
/// ```
/// use filearc_core::types::contained_path;
/// use std::path::PathBuf;
///
/// assert_eq!(contained_path("a/./b"), Some(PathBuf::from("a/b")));
/// assert_eq!(contained_path("a/../b"), Some(PathBuf::from("b")));
/// assert_eq!(contained_path("a/../../etc/passwd"), None);
/// ```
#[must_use]
pub fn contained_path(name: &str) -> Option<PathBuf> {
    let mut segments: Vec<&str> = Vec::new();

    for segment in name.split(|c| c == '/' || c == MAIN_SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            normal => segments.push(normal),
        }
    }

    Some(segments.iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_entry_name() {
        assert_eq!(normalize_entry_name("a.txt"), "a.txt");
        assert_eq!(normalize_entry_name("./a.txt"), "a.txt");
        assert_eq!(normalize_entry_name("c/"), "c");
        assert_eq!(normalize_entry_name("./"), "");
        assert_eq!(normalize_entry_name("."), "");
        assert_eq!(normalize_entry_name("/etc/passwd"), "etc/passwd");
        assert_eq!(normalize_entry_name("../x"), "../x");
    }

    #[test]
    fn test_contained_path() {
        assert_eq!(contained_path("c/c1.txt"), Some(PathBuf::from("c/c1.txt")));
        assert_eq!(contained_path(""), Some(PathBuf::new()));
        assert_eq!(contained_path("../x"), None);
        assert_eq!(contained_path("a/b/../../../x"), None);
        assert_eq!(contained_path("a/b/../../x"), Some(PathBuf::from("x")));
    }

    #[test]
    fn test_archive_entry_builder() {
        let entry = ArchiveEntry::new("./c/c1.txt", EntryType::File)
            .with_size(5)
            .with_mode(0o644);
        assert_eq!(entry.name, "c/c1.txt");
        assert_eq!(entry.size, 5);
        assert_eq!(entry.mode, Some(0o644));
        assert_eq!(entry.modified, None);
        assert_eq!(entry.base_name(), "c1.txt");
    }

    #[test]
    fn test_base_name_without_separator() {
        let entry = ArchiveEntry::new("a.txt", EntryType::File);
        assert_eq!(entry.base_name(), "a.txt");
    }
}
