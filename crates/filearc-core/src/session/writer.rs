//! Write session: one output file, its encoder and its container writer.

use std::fmt;
use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::BufWriter;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use log::debug;
use log::warn;
use zip::ZipWriter;

use super::append::AppendPoint;
use super::append::open_for_append;
use crate::ArchiveError;
use crate::Result;
use crate::creation::FilteredWalker;
use crate::error::zip_error;
use crate::filter::FilterSpec;
use crate::formats::CompressionKind;
use crate::formats::ContainerFormat;
use crate::formats::Encoder;
use crate::formats::tar as tar_codec;
use crate::formats::zip as zip_codec;
use crate::report::CreationReport;
use crate::types::ArchiveEntry;
use crate::types::EntryType;
use crate::types::normalize_entry_name;

/// An archive opened for writing, either freshly created or appended to.
///
/// Layers are finished inner to outer by [`close`](Self::close): container,
/// then compression, then the file. If any write fails, or the writer is
/// dropped without being closed, the output is discarded: a new archive is
/// deleted and an appended one is cut back to its original bytes.
///
/// # Examples
///
/// ```no_run
/// use filearc_core::ArchiveWriter;
/// use filearc_core::CompressionKind;
/// use filearc_core::ContainerFormat;
/// use filearc_core::FilterSpec;
/// use std::path::Path;
///
/// let mut writer =
///     ArchiveWriter::create("out.tar.gz", ContainerFormat::Tar, CompressionKind::Gzip, None)?;
/// let report = writer.add_tree(Path::new("src"), true, &FilterSpec::default())?;
/// writer.close()?;
/// println!("added {} files", report.files_added);
/// # Ok::<(), filearc_core::ArchiveError>(())
/// ```
pub struct ArchiveWriter {
    path: PathBuf,
    format: ContainerFormat,
    compression: CompressionKind,
    level: Option<u8>,
    container: Option<ContainerWriter>,
    cleanup: Cleanup,
    poisoned: bool,
}

enum ContainerWriter {
    Tar(tar::Builder<Encoder<BufWriter<File>>>),
    Zip(ZipWriter<BufWriter<File>>),
}

/// How to undo a session that did not close cleanly.
#[derive(Debug, Clone, Copy)]
enum Cleanup {
    Remove,
    Restore { offset: u64, original_len: u64 },
}

impl ArchiveWriter {
    /// Creates (or truncates) `path` and prepares the chosen layers.
    ///
    /// `level` is on the 1-9 scale; for zip, 0 stores entries uncompressed.
    ///
    /// # Errors
    ///
    /// - [`ArchiveError::Bzip2WriteNotSupported`] for bzip2, before any file
    ///   is created.
    /// - [`ArchiveError::UnsupportedFormat`] for zip with a compression
    ///   layer.
    /// - I/O errors creating the file.
    pub fn create<P: AsRef<Path>>(
        path: P,
        format: ContainerFormat,
        compression: CompressionKind,
        level: Option<u8>,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if compression == CompressionKind::Bzip2 {
            return Err(ArchiveError::Bzip2WriteNotSupported);
        }
        if format == ContainerFormat::Zip && compression != CompressionKind::Uncompressed {
            return Err(ArchiveError::UnsupportedFormat {
                reason: format!("zip archives cannot be wrapped in {compression}"),
            });
        }

        let writer = BufWriter::new(File::create(&path)?);
        let container = match format {
            ContainerFormat::Tar => {
                ContainerWriter::Tar(tar::Builder::new(Encoder::new(writer, compression, level)?))
            }
            ContainerFormat::Zip => ContainerWriter::Zip(ZipWriter::new(writer)),
        };

        debug!(
            "created {} ({format}, compression: {compression})",
            path.display()
        );

        Ok(Self {
            path,
            format,
            compression,
            level,
            container: Some(container),
            cleanup: Cleanup::Remove,
            poisoned: false,
        })
    }

    /// Opens an existing uncompressed tar and positions new entries over its
    /// end-of-archive marker.
    ///
    /// # Errors
    ///
    /// - [`ArchiveError::AppendNotSupported`] for compressed or zip archives;
    ///   the file is left untouched.
    /// - [`ArchiveError::InvalidArchive`] if the file is not a well-formed
    ///   tar.
    pub fn append<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let AppendPoint {
            file,
            offset,
            original_len,
        } = open_for_append(&path)?;

        let builder = tar::Builder::new(Encoder::Plain(BufWriter::new(file)));

        debug!("appending to {} at offset {offset}", path.display());

        Ok(Self {
            path,
            format: ContainerFormat::Tar,
            compression: CompressionKind::Uncompressed,
            level: None,
            container: Some(ContainerWriter::Tar(builder)),
            cleanup: Cleanup::Restore {
                offset,
                original_len,
            },
            poisoned: false,
        })
    }

    /// Returns the archive path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the container format being written.
    #[must_use]
    pub const fn format(&self) -> ContainerFormat {
        self.format
    }

    /// Returns the compression layer being written.
    #[must_use]
    pub const fn compression(&self) -> CompressionKind {
        self.compression
    }

    /// Walks `source` and stores every object that passes `filter`.
    ///
    /// Names are relative to `source` itself, or to its parent when
    /// `include_source_dir` is set or `source` is a single file. Sockets,
    /// FIFOs and device nodes are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Any walk, read or container error aborts the walk; the session is
    /// then discarded by [`close`](Self::close).
    pub fn add_tree(
        &mut self,
        source: &Path,
        include_source_dir: bool,
        filter: &FilterSpec,
    ) -> Result<CreationReport> {
        let start = Instant::now();

        let result = self.walk_into(source, include_source_dir, filter);
        if result.is_err() {
            self.poisoned = true;
        }

        result.map(|mut report| {
            report.duration = start.elapsed();
            report
        })
    }

    fn walk_into(
        &mut self,
        source: &Path,
        include_source_dir: bool,
        filter: &FilterSpec,
    ) -> Result<CreationReport> {
        let walker = FilteredWalker::new(source, include_source_dir, filter)?;
        let mut report = CreationReport::new();

        for walked in walker.walk() {
            let walked = walked?;
            let entry = &walked.entry;

            match &entry.entry_type {
                EntryType::File => {
                    let mut content = File::open(&walked.path)?.take(entry.size);
                    let content: &mut dyn Read = &mut content;
                    report.bytes_written += self.put(entry, Some(content))?;
                    report.files_added += 1;
                }
                EntryType::Directory => {
                    self.put(entry, None)?;
                    report.directories_added += 1;
                }
                EntryType::Symlink { .. } => {
                    self.put(entry, None)?;
                    report.symlinks_added += 1;
                }
                EntryType::Unsupported { kind } => {
                    warn!("skipping {} ({kind})", walked.path.display());
                    report.entries_skipped += 1;
                }
            }
        }

        Ok(report)
    }

    /// Writes one caller-supplied entry.
    ///
    /// File entries must carry the exact content length in `entry.size`.
    /// Returns the number of content bytes stored.
    ///
    /// # Errors
    ///
    /// - [`ArchiveError::InvalidArchive`] if the name is empty or contains
    ///   `..` after normalization. Nothing is written.
    /// - [`ArchiveError::UnsupportedType`] for kinds that cannot be stored.
    /// - I/O or container errors, after which the session is discarded by
    ///   [`close`](Self::close).
    pub fn write_entry(
        &mut self,
        entry: &ArchiveEntry,
        content: Option<&mut dyn Read>,
    ) -> Result<u64> {
        let name = normalize_entry_name(&entry.name);
        if name.is_empty() || name.split('/').any(|segment| segment == "..") {
            return Err(ArchiveError::InvalidArchive(format!(
                "invalid entry name: {:?}",
                entry.name
            )));
        }

        let result = if name == entry.name {
            self.put(entry, content)
        } else {
            let mut normalized = entry.clone();
            normalized.name = name;
            self.put(&normalized, content)
        };

        if matches!(result, Err(ref e) if !matches!(e, ArchiveError::UnsupportedType { .. })) {
            self.poisoned = true;
        }
        result
    }

    fn put(&mut self, entry: &ArchiveEntry, content: Option<&mut dyn Read>) -> Result<u64> {
        match self.container.as_mut() {
            Some(ContainerWriter::Tar(builder)) => tar_codec::write_entry(builder, entry, content),
            Some(ContainerWriter::Zip(zip)) => {
                zip_codec::write_entry(zip, entry, content, self.level)
            }
            None => Err(closed_error()),
        }
    }

    /// Finishes every layer and closes the file.
    ///
    /// # Errors
    ///
    /// Returns an error if an earlier write failed or finishing fails; the
    /// output is discarded in both cases.
    pub fn close(mut self) -> Result<()> {
        let Some(container) = self.container.take() else {
            return Ok(());
        };

        if self.poisoned {
            drop(container);
            self.discard();
            return Err(ArchiveError::Io(io::Error::other(format!(
                "an earlier write to {} failed; output discarded",
                self.path.display()
            ))));
        }

        match finish(container) {
            Ok(len) => {
                debug!("closed {} ({len} bytes)", self.path.display());
                Ok(())
            }
            Err(e) => {
                self.discard();
                Err(e)
            }
        }
    }

    fn discard(&mut self) {
        self.container = None;

        let outcome = match self.cleanup {
            Cleanup::Remove => fs::remove_file(&self.path),
            Cleanup::Restore {
                offset,
                original_len,
            } => restore(&self.path, offset, original_len),
        };

        match outcome {
            Ok(()) => debug!("discarded output to {}", self.path.display()),
            Err(e) => warn!(
                "failed to clean up {} after an aborted write: {e}",
                self.path.display()
            ),
        }
    }
}

impl Drop for ArchiveWriter {
    fn drop(&mut self) {
        if self.container.is_some() {
            debug!("{} dropped without close", self.path.display());
            self.discard();
        }
    }
}

impl fmt::Debug for ArchiveWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveWriter")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("compression", &self.compression)
            .field("level", &self.level)
            .field("poisoned", &self.poisoned)
            .finish_non_exhaustive()
    }
}

/// Finishes container, encoder and buffer in that order and trims the file
/// to the end of the written data. Returns the final file length.
fn finish(container: ContainerWriter) -> Result<u64> {
    let buffered = match container {
        ContainerWriter::Tar(builder) => builder.into_inner()?.finish()?,
        ContainerWriter::Zip(zip) => zip.finish().map_err(zip_error)?,
    };

    let mut file = buffered
        .into_inner()
        .map_err(|e| ArchiveError::Io(e.into_error()))?;
    let end = file.stream_position()?;
    file.set_len(end)?;

    Ok(end)
}

/// Cuts appended data off and rewrites the zero-filled tail that followed
/// the original entries.
fn restore(path: &Path, offset: u64, original_len: u64) -> io::Result<()> {
    let file = OpenOptions::new().write(true).open(path)?;
    file.set_len(offset)?;
    file.set_len(original_len)
}

fn closed_error() -> ArchiveError {
    ArchiveError::Io(io::Error::other("archive writer is closed"))
}
