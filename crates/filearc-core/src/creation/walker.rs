//! Directory tree walking with filtering.
//!
//! Objects are visited depth-first, parents before children, siblings in
//! file-name order. Each object is named relative to a base directory and
//! checked against a [`FilterSpec`]; a directory that fails the check is
//! pruned, since every descendant would fail at the same segment.

use std::fs::Metadata;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::ArchiveError;
use crate::Result;
use crate::filter::FilterSpec;
use crate::types::ArchiveEntry;
use crate::types::EntryType;

/// Walks a source tree, yielding archive entries for matching objects.
///
/// # Examples
///
/// ```no_run
/// use filearc_core::FilterSpec;
/// use filearc_core::creation::walker::FilteredWalker;
/// use std::path::Path;
///
/// let filter = FilterSpec::default();
/// let walker = FilteredWalker::new(Path::new("./project"), false, &filter)?;
///
/// for entry in walker.walk() {
///     let entry = entry?;
///     println!("Would add: {}", entry.entry.name);
/// }
/// # Ok::<(), filearc_core::ArchiveError>(())
/// ```
#[derive(Debug)]
pub struct FilteredWalker<'a> {
    source: PathBuf,
    base_dir: PathBuf,
    filter: &'a FilterSpec,
}

impl<'a> FilteredWalker<'a> {
    /// Creates a walker rooted at `source`.
    ///
    /// Names are relative to `source` itself when it is a directory and
    /// `include_source_dir` is false, and relative to its parent otherwise,
    /// so the source's own name becomes the first path segment.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::SourceNotFound`] if `source` does not exist.
    pub fn new(source: &Path, include_source_dir: bool, filter: &'a FilterSpec) -> Result<Self> {
        // Re-collecting the components drops trailing separators.
        let source: PathBuf = source.components().collect();

        if std::fs::symlink_metadata(&source).is_err() {
            return Err(ArchiveError::SourceNotFound { path: source });
        }

        let base_dir = if source.is_dir() && !include_source_dir {
            source.clone()
        } else {
            source
                .parent()
                .map_or_else(|| source.clone(), Path::to_path_buf)
        };

        Ok(Self {
            source,
            base_dir,
            filter,
        })
    }

    /// Returns an iterator over the entries to store, in walk order.
    ///
    /// The base directory itself is never yielded. Sockets, FIFOs and device
    /// nodes are yielded as [`EntryType::Unsupported`] for the writer to skip.
    ///
    /// # Errors
    ///
    /// Entries may error if a directory cannot be read, metadata cannot be
    /// read, or a symlink target cannot be read.
    pub fn walk(&self) -> impl Iterator<Item = Result<FilteredEntry>> + '_ {
        let walker = WalkDir::new(&self.source)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                self.relative_name(entry.path())
                    .is_none_or(|name| self.filter.matches(&name))
            });

        walker.filter_map(move |entry| match entry {
            Ok(entry) => {
                let name = self.relative_name(entry.path())?;
                Some(build_filtered_entry(&entry, &name))
            }
            Err(e) => Some(Err(ArchiveError::Io(std::io::Error::other(format!(
                "walkdir error: {e}"
            ))))),
        })
    }

    /// `/`-joined name of `path` relative to the base directory, or `None`
    /// for the base directory itself.
    fn relative_name(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.base_dir).ok()?;
        let name = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(segment) => Some(segment.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");

        (!name.is_empty()).then_some(name)
    }
}

/// A walked object paired with the archive entry describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredEntry {
    /// Full filesystem path to the object.
    pub path: PathBuf,

    /// Entry metadata, named relative to the walk's base directory.
    pub entry: ArchiveEntry,
}

/// Builds a `FilteredEntry` from a `walkdir::DirEntry`.
fn build_filtered_entry(entry: &walkdir::DirEntry, name: &str) -> Result<FilteredEntry> {
    let path = entry.path().to_path_buf();
    let metadata = entry.metadata().map_err(|e| {
        ArchiveError::Io(std::io::Error::other(format!(
            "cannot read metadata for {}: {e}",
            path.display()
        )))
    })?;

    let file_type = metadata.file_type();
    let entry_type = if file_type.is_symlink() {
        let target = std::fs::read_link(&path).map_err(|e| {
            ArchiveError::Io(std::io::Error::other(format!(
                "cannot read symlink target for {}: {e}",
                path.display()
            )))
        })?;
        EntryType::Symlink { target }
    } else if file_type.is_dir() {
        EntryType::Directory
    } else if file_type.is_file() {
        EntryType::File
    } else {
        EntryType::Unsupported {
            kind: special_kind(&file_type),
        }
    };

    let size = if entry_type.is_file() {
        metadata.len()
    } else {
        0
    };

    let mut archive_entry = ArchiveEntry::new(name, entry_type)
        .with_size(size)
        .with_mode(permission_bits(&metadata));
    archive_entry.modified = metadata.modified().ok();

    Ok(FilteredEntry {
        path,
        entry: archive_entry,
    })
}

#[cfg(unix)]
fn special_kind(file_type: &std::fs::FileType) -> &'static str {
    use std::os::unix::fs::FileTypeExt;

    if file_type.is_fifo() {
        "fifo"
    } else if file_type.is_socket() {
        "socket"
    } else if file_type.is_block_device() {
        "block device"
    } else if file_type.is_char_device() {
        "character device"
    } else {
        "unknown"
    }
}

#[cfg(not(unix))]
fn special_kind(_file_type: &std::fs::FileType) -> &'static str {
    "unknown"
}

#[cfg(unix)]
fn permission_bits(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &Metadata) -> u32 {
    if metadata.is_dir() {
        0o755
    } else if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}
