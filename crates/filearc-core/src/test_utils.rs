//! Test utilities: filesystem fixtures and in-memory archive builders.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::fs;
use std::io::Cursor;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

/// Creates the standard input tree under `root` and returns its path:
///
/// ```text
/// input/
///   a.txt       "a.txt"
///   b.txt       "b.txt"
///   c/c1.txt    "c1.txt"
///   c/c2.txt    "c2.txt"
///   d/
/// ```
///
/// Every file holds its own base name as content.
pub fn create_fixture_tree(root: &Path) -> PathBuf {
    let input = root.join("input");
    fs::create_dir_all(input.join("c")).unwrap();
    fs::create_dir_all(input.join("d")).unwrap();
    fs::write(input.join("a.txt"), "a.txt").unwrap();
    fs::write(input.join("b.txt"), "b.txt").unwrap();
    fs::write(input.join("c/c1.txt"), "c1.txt").unwrap();
    fs::write(input.join("c/c2.txt"), "c2.txt").unwrap();
    input
}

/// Lists every path under `root` relative to it, `/`-joined and sorted.
///
/// Directories are included.
#[must_use]
pub fn list_tree(root: &Path) -> Vec<String> {
    let mut paths: Vec<String> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|entry| {
            let entry = entry.unwrap();
            let relative = entry.path().strip_prefix(root).unwrap();
            relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    paths.sort();
    paths
}

/// Builder for tar test archives, including entries the library itself
/// refuses to write (traversal names, hard links, devices).
///
/// # Examples
///
/// ```
/// use filearc_core::test_utils::TarTestBuilder;
///
/// let tar_data = TarTestBuilder::new()
///     .add_file("file.txt", b"content")
///     .add_directory("dir/")
///     .add_symlink("link", "file.txt")
///     .build();
/// ```
pub struct TarTestBuilder {
    builder: tar::Builder<Vec<u8>>,
}

impl TarTestBuilder {
    /// Creates a new tar test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
        }
    }

    /// Adds a regular file with mode 0o644.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_with_mode(path, data, 0o644)
    }

    /// Adds a regular file with a custom mode.
    #[must_use]
    pub fn add_file_with_mode(mut self, path: &str, data: &[u8], mode: u32) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(mode);
        header.set_cksum();
        self.builder.append_data(&mut header, path, data).unwrap();
        self
    }

    /// Adds a directory.
    #[must_use]
    pub fn add_directory(mut self, path: &str) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o755);
        header.set_entry_type(tar::EntryType::Directory);
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a symlink.
    #[must_use]
    pub fn add_symlink(self, path: &str, target: &str) -> Self {
        self.add_link(path, target, tar::EntryType::Symlink)
    }

    /// Adds a hard link.
    #[must_use]
    pub fn add_hardlink(self, path: &str, target: &str) -> Self {
        self.add_link(path, target, tar::EntryType::Link)
    }

    /// Adds a FIFO entry.
    #[must_use]
    pub fn add_fifo(mut self, path: &str) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Fifo);
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a regular file whose stored name is written verbatim, bypassing
    /// the `tar` crate's path checks. Names must fit in 100 bytes.
    #[must_use]
    pub fn add_file_raw_name(mut self, name: &str, data: &[u8]) -> Self {
        let mut header = tar::Header::new_gnu();
        header.as_old_mut().name[..name.len()].copy_from_slice(name.as_bytes());
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        self.builder.append(&header, data).unwrap();
        self
    }

    fn add_link(mut self, path: &str, target: &str, kind: tar::EntryType) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o777);
        header.set_entry_type(kind);
        self.builder.append_link(&mut header, path, target).unwrap();
        self
    }

    /// Builds and returns the tar archive data.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.builder.into_inner().unwrap()
    }
}

impl Default for TarTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for zip test archives.
///
/// # Examples
///
/// ```
/// use filearc_core::test_utils::ZipTestBuilder;
///
/// let zip_data = ZipTestBuilder::new()
///     .add_file("file.txt", b"content")
///     .add_directory("dir/")
///     .build();
/// ```
pub struct ZipTestBuilder {
    zip: zip::ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipTestBuilder {
    /// Creates a new zip test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            zip: zip::ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Adds a stored regular file with mode 0o644.
    #[must_use]
    pub fn add_file(mut self, path: &str, data: &[u8]) -> Self {
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .unix_permissions(0o644);

        self.zip.start_file(path, options).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    /// Adds a directory.
    #[must_use]
    pub fn add_directory(mut self, path: &str) -> Self {
        let options = zip::write::SimpleFileOptions::default().unix_permissions(0o755);
        self.zip.add_directory(path, options).unwrap();
        self
    }

    /// Adds a symlink stored with `S_IFLNK` mode bits and the target as
    /// content.
    #[must_use]
    pub fn add_symlink(mut self, path: &str, target: &str) -> Self {
        let options = zip::write::SimpleFileOptions::default();
        self.zip.add_symlink(path, target, options).unwrap();
        self
    }

    /// Builds and returns the zip archive data.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.zip.finish().unwrap().into_inner()
    }
}

impl Default for ZipTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes `data` to `dir/name` and returns the path.
pub fn write_archive(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, data).unwrap();
    path
}
