//! Read session: one opened archive, its decoder and its container reader.

use std::fmt;
use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;
use std::path::PathBuf;

use log::debug;
use zip::ZipArchive;

use crate::ArchiveError;
use crate::Result;
use crate::config::ExtractOptions;
use crate::error::zip_error;
use crate::extraction;
use crate::formats::CompressionKind;
use crate::formats::ContainerFormat;
use crate::formats::Decoder;
use crate::formats::detect::detect_compression;
use crate::formats::detect::detect_container;
use crate::formats::detect::is_zip_signature;
use crate::formats::tar as tar_codec;
use crate::formats::zip as zip_codec;
use crate::report::ExtractionReport;
use crate::types::ArchiveEntry;
use crate::types::normalize_entry_name;

/// Content of the entry most recently returned by a cursor.
///
/// The stream borrows the session, so it must be dropped before the next
/// entry is requested.
pub type EntryStream<'a> = Box<dyn Read + 'a>;

/// An archive opened for reading.
///
/// Compression is detected from the leading bytes of the file and the
/// container from the leading bytes of the decoded stream; the file name is
/// never consulted.
///
/// # Examples
///
/// ```no_run
/// use filearc_core::ArchiveReader;
///
/// let mut reader = ArchiveReader::open("backup.tar.gz")?;
/// for entry in reader.list()? {
///     println!("{} ({} bytes)", entry.name, entry.size);
/// }
/// reader.close()?;
/// # Ok::<(), filearc_core::ArchiveError>(())
/// ```
pub struct ArchiveReader {
    path: PathBuf,
    compression: CompressionKind,
    container: ContainerReader,
}

enum ContainerReader {
    Tar {
        archive: tar::Archive<Decoder>,
        started: bool,
    },
    Zip(ZipArchive<BufReader<File>>),
}

impl ArchiveReader {
    /// Opens an archive and detects its compression and container.
    ///
    /// # Errors
    ///
    /// - I/O errors opening or reading the file.
    /// - [`ArchiveError::UnsupportedFormat`] for a zip file wrapped in a
    ///   compression layer.
    /// - [`ArchiveError::InvalidArchive`] if the zip central directory or
    ///   the compressed stream cannot be decoded.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path)?;

        let compression = detect_compression(&mut file)?;
        let format = if compression == CompressionKind::Uncompressed {
            detect_container(&mut file)?
        } else {
            reject_compressed_zip(&mut file, compression)?;
            ContainerFormat::Tar
        };

        let container = match format {
            ContainerFormat::Tar => ContainerReader::Tar {
                archive: tar::Archive::new(Decoder::new(file, compression)),
                started: false,
            },
            ContainerFormat::Zip => {
                ContainerReader::Zip(ZipArchive::new(BufReader::new(file)).map_err(zip_error)?)
            }
        };

        debug!(
            "opened {} for reading ({format}, compression: {compression})",
            path.display()
        );

        Ok(Self {
            path,
            compression,
            container,
        })
    }

    /// Returns the archive path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the detected compression layer.
    #[must_use]
    pub const fn compression(&self) -> CompressionKind {
        self.compression
    }

    /// Returns the detected container format.
    #[must_use]
    pub const fn format(&self) -> ContainerFormat {
        match self.container {
            ContainerReader::Tar { .. } => ContainerFormat::Tar,
            ContainerReader::Zip(_) => ContainerFormat::Zip,
        }
    }

    /// Returns a cursor positioned before the first entry.
    ///
    /// Calling this again restarts from the first entry; a compressed tar is
    /// reopened and decoded from the beginning.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the archive must be reopened and cannot be.
    pub fn entries(&mut self) -> Result<Entries<'_>> {
        let inner = match &mut self.container {
            ContainerReader::Tar { archive, started } => {
                if *started {
                    *archive = reopen_tar(&self.path, self.compression)?;
                }
                *started = true;
                EntriesInner::Tar(archive.entries().map_err(tar_error)?)
            }
            ContainerReader::Zip(archive) => EntriesInner::Zip { archive, index: 0 },
        };

        Ok(Entries { inner })
    }

    /// Reads every entry header in archive order.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidArchive`] on corrupt framing, or an I/O
    /// error.
    pub fn list(&mut self) -> Result<Vec<ArchiveEntry>> {
        let mut entries = self.entries()?;
        let mut listed = Vec::new();

        while let Some((entry, _)) = entries.next_entry()? {
            listed.push(entry);
        }

        Ok(listed)
    }

    /// Finds the first entry named `name` and returns it with a content
    /// stream for regular files.
    ///
    /// Names are compared after normalization, so `./c/` finds the directory
    /// stored as `c/`. Directories, symlinks and other kinds come back
    /// without a stream.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::NotFound`] if no entry has that name.
    pub fn read_entry(&mut self, name: &str) -> Result<(ArchiveEntry, Option<EntryStream<'_>>)> {
        let wanted = normalize_entry_name(name);
        if wanted.is_empty() {
            return Err(ArchiveError::NotFound {
                name: name.to_string(),
            });
        }

        match &mut self.container {
            ContainerReader::Tar { archive, started } => {
                if *started {
                    *archive = reopen_tar(&self.path, self.compression)?;
                }
                *started = true;

                for entry in archive.entries().map_err(tar_error)? {
                    let entry = entry.map_err(tar_error)?;
                    let Some(found) = tar_codec::read_entry(&entry)? else {
                        continue;
                    };
                    if found.name == wanted {
                        let stream = found
                            .entry_type
                            .is_file()
                            .then(|| Box::new(entry) as EntryStream<'_>);
                        return Ok((found, stream));
                    }
                }
            }
            ContainerReader::Zip(archive) => {
                let mut index = None;
                for i in 0..archive.len() {
                    let raw = archive.by_index_raw(i).map_err(zip_error)?;
                    if normalize_entry_name(raw.name()) == wanted {
                        index = Some(i);
                        break;
                    }
                }

                if let Some(i) = index {
                    let mut file = archive.by_index(i).map_err(zip_error)?;
                    let found = zip_codec::read_entry(&mut file)?;
                    let stream = found
                        .entry_type
                        .is_file()
                        .then(|| Box::new(file) as EntryStream<'_>);
                    return Ok((found, stream));
                }
            }
        }

        Err(ArchiveError::NotFound {
            name: name.to_string(),
        })
    }

    /// Extracts entries under `match_prefix` into `target`.
    ///
    /// The prefix is stripped from written paths; an empty prefix extracts
    /// everything. `options.match_prefix` is not consulted here.
    ///
    /// # Errors
    ///
    /// See [`extract_entries`](crate::extraction::extract_entries).
    pub fn extract(
        &mut self,
        match_prefix: &str,
        target: &Path,
        options: &ExtractOptions,
    ) -> Result<ExtractionReport> {
        debug!(
            "extracting {} into {}",
            self.path.display(),
            target.display()
        );
        let mut entries = self.entries()?;
        extraction::extract_entries(&mut entries, match_prefix, target, options)
    }

    /// Closes the archive.
    ///
    /// # Errors
    ///
    /// Reading holds no buffered output, so closing currently cannot fail.
    pub fn close(self) -> Result<()> {
        debug!("closed {}", self.path.display());
        Ok(())
    }
}

impl fmt::Debug for ArchiveReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveReader")
            .field("path", &self.path)
            .field("format", &self.format())
            .field("compression", &self.compression)
            .finish()
    }
}

/// Sequential cursor over the entries of an [`ArchiveReader`].
pub struct Entries<'a> {
    inner: EntriesInner<'a>,
}

enum EntriesInner<'a> {
    Tar(tar::Entries<'a, Decoder>),
    Zip {
        archive: &'a mut ZipArchive<BufReader<File>>,
        index: usize,
    },
}

impl Entries<'_> {
    /// Advances to the next entry.
    ///
    /// Returns `Ok(None)` at the end of the archive. Unread content of the
    /// previous entry is skipped. Tar pax global headers and the archive
    /// root (`./`) are not entries and are passed over.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidArchive`] on corrupt framing, or an I/O
    /// error.
    pub fn next_entry(&mut self) -> Result<Option<(ArchiveEntry, EntryStream<'_>)>> {
        match &mut self.inner {
            EntriesInner::Tar(entries) => {
                for entry in entries.by_ref() {
                    let entry = entry.map_err(tar_error)?;
                    if let Some(found) = tar_codec::read_entry(&entry)? {
                        return Ok(Some((found, Box::new(entry))));
                    }
                }
                Ok(None)
            }
            EntriesInner::Zip { archive, index } => {
                while archive
                    .name_for_index(*index)
                    .is_some_and(|name| normalize_entry_name(name).is_empty())
                {
                    *index += 1;
                }
                if *index >= archive.len() {
                    return Ok(None);
                }
                let current = *index;
                *index += 1;

                let mut file = archive.by_index(current).map_err(zip_error)?;
                let found = zip_codec::read_entry(&mut file)?;
                Ok(Some((found, Box::new(file))))
            }
        }
    }
}

fn reopen_tar(path: &Path, compression: CompressionKind) -> Result<tar::Archive<Decoder>> {
    let file = File::open(path)?;
    Ok(tar::Archive::new(Decoder::new(file, compression)))
}

/// Framing and decoding failures become [`ArchiveError::InvalidArchive`];
/// errors from the file itself (permissions, device errors) stay I/O errors.
/// The `tar` crate reports malformed headers as `ErrorKind::Other`.
fn tar_error(err: io::Error) -> ArchiveError {
    match err.kind() {
        io::ErrorKind::InvalidData
        | io::ErrorKind::InvalidInput
        | io::ErrorKind::UnexpectedEof
        | io::ErrorKind::Other => {
            ArchiveError::InvalidArchive(format!("failed to read tar entry: {err}"))
        }
        _ => ArchiveError::Io(err),
    }
}

/// Zip has no outer compression layer; a compressed zip is refused up front
/// instead of failing later as a corrupt tar.
fn reject_compressed_zip(file: &mut File, compression: CompressionKind) -> Result<()> {
    let mut head = Vec::with_capacity(4);
    Decoder::new(file.try_clone()?, compression)
        .take(4)
        .read_to_end(&mut head)
        .map_err(|e| {
            ArchiveError::InvalidArchive(format!("failed to decode {compression} stream: {e}"))
        })?;
    file.seek(SeekFrom::Start(0))?;

    if is_zip_signature(&head) {
        return Err(ArchiveError::UnsupportedFormat {
            reason: format!("zip archive inside a {compression} stream"),
        });
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::EntryType;
    use crate::test_utils::TarTestBuilder;
    use crate::test_utils::ZipTestBuilder;
    use crate::test_utils::write_archive;
    use std::io::Write;
    use tempfile::TempDir;

    fn sample_tar() -> Vec<u8> {
        TarTestBuilder::new()
            .add_directory("c/")
            .add_file("c/c1.txt", b"c1.txt")
            .add_symlink("link", "c/c1.txt")
            .build()
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_open_detects_formats() {
        let temp = TempDir::new().unwrap();

        let tar = write_archive(temp.path(), "plain.bin", &sample_tar());
        let reader = ArchiveReader::open(&tar).unwrap();
        assert_eq!(reader.format(), ContainerFormat::Tar);
        assert_eq!(reader.compression(), CompressionKind::Uncompressed);

        let tgz = write_archive(temp.path(), "misnamed.tar", &gzip(&sample_tar()));
        let reader = ArchiveReader::open(&tgz).unwrap();
        assert_eq!(reader.compression(), CompressionKind::Gzip);

        let zip = write_archive(
            temp.path(),
            "out.dat",
            &ZipTestBuilder::new().add_file("a", b"a").build(),
        );
        assert_eq!(
            ArchiveReader::open(&zip).unwrap().format(),
            ContainerFormat::Zip
        );
    }

    #[test]
    fn test_open_refuses_gzipped_zip() {
        let temp = TempDir::new().unwrap();
        let zip = ZipTestBuilder::new().add_file("a", b"a").build();
        let path = write_archive(temp.path(), "out.zip.gz", &gzip(&zip));

        let err = ArchiveReader::open(&path).unwrap_err();
        assert!(matches!(err, ArchiveError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_open_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = ArchiveReader::open(temp.path().join("missing.tar")).unwrap_err();
        assert!(matches!(err, ArchiveError::Io(_)));
    }

    #[test]
    fn test_cursor_yields_entries_then_none() {
        let temp = TempDir::new().unwrap();
        let path = write_archive(temp.path(), "out.tar", &sample_tar());
        let mut reader = ArchiveReader::open(&path).unwrap();

        let mut entries = reader.entries().unwrap();
        let (dir, _) = entries.next_entry().unwrap().unwrap();
        assert_eq!(dir.name, "c");
        assert!(dir.entry_type.is_directory());

        let (file, mut stream) = entries.next_entry().unwrap().unwrap();
        assert_eq!(file.name, "c/c1.txt");
        let mut content = String::new();
        stream.read_to_string(&mut content).unwrap();
        assert_eq!(content, "c1.txt");
        drop(stream);

        let (link, _) = entries.next_entry().unwrap().unwrap();
        assert_eq!(link.entry_type.link_target(), Some(Path::new("c/c1.txt")));

        assert!(entries.next_entry().unwrap().is_none());
        assert!(entries.next_entry().unwrap().is_none());
    }

    #[test]
    fn test_list_is_repeatable() {
        let temp = TempDir::new().unwrap();
        let path = write_archive(temp.path(), "out.tar.gz", &gzip(&sample_tar()));
        let mut reader = ArchiveReader::open(&path).unwrap();

        let first = reader.list().unwrap();
        let second = reader.list().unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_read_entry_tar() {
        let temp = TempDir::new().unwrap();
        let path = write_archive(temp.path(), "out.tar", &sample_tar());
        let mut reader = ArchiveReader::open(&path).unwrap();

        let (entry, stream) = reader.read_entry("./c/c1.txt").unwrap();
        assert_eq!(entry.size, 6);
        let mut content = Vec::new();
        stream.unwrap().read_to_end(&mut content).unwrap();
        assert_eq!(content, b"c1.txt");

        let (entry, stream) = reader.read_entry("c/").unwrap();
        assert_eq!(entry.entry_type, EntryType::Directory);
        assert!(stream.is_none());
    }

    #[test]
    fn test_read_entry_zip() {
        let temp = TempDir::new().unwrap();
        let data = ZipTestBuilder::new()
            .add_directory("d/")
            .add_file("d/x.txt", b"zip content")
            .build();
        let path = write_archive(temp.path(), "out.zip", &data);
        let mut reader = ArchiveReader::open(&path).unwrap();

        let (entry, stream) = reader.read_entry("d/x.txt").unwrap();
        assert!(entry.entry_type.is_file());
        let mut content = String::new();
        stream.unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "zip content");

        let (entry, stream) = reader.read_entry("d").unwrap();
        assert!(entry.entry_type.is_directory());
        assert!(stream.is_none());
    }

    #[test]
    fn test_read_entry_not_found() {
        let temp = TempDir::new().unwrap();
        let path = write_archive(temp.path(), "out.tar", &sample_tar());
        let mut reader = ArchiveReader::open(&path).unwrap();

        let err = reader.read_entry("c/c9.txt").err().expect("expected an error");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_tar_error_keeps_file_errors() {
        assert!(matches!(
            tar_error(io::Error::from(io::ErrorKind::PermissionDenied)),
            ArchiveError::Io(_)
        ));
        assert!(matches!(
            tar_error(io::Error::from(io::ErrorKind::UnexpectedEof)),
            ArchiveError::InvalidArchive(_)
        ));
        assert!(matches!(
            tar_error(io::Error::other("archive header checksum mismatch")),
            ArchiveError::InvalidArchive(_)
        ));
    }

    #[test]
    fn test_list_skips_archive_root() {
        let temp = TempDir::new().unwrap();
        let data = TarTestBuilder::new()
            .add_directory("./")
            .add_file("./b.txt", b"b")
            .add_directory("./c/")
            .build();
        let path = write_archive(temp.path(), "dot.tar", &data);
        let mut reader = ArchiveReader::open(&path).unwrap();

        let names: Vec<String> = reader.list().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, ["b.txt", "c"]);
        assert!(reader.read_entry("./").err().expect("expected an error").is_not_found());
    }

    #[test]
    fn test_list_skips_zip_root() {
        let temp = TempDir::new().unwrap();
        let data = ZipTestBuilder::new()
            .add_directory("./")
            .add_file("a.txt", b"a")
            .build();
        let path = write_archive(temp.path(), "dot.zip", &data);
        let mut reader = ArchiveReader::open(&path).unwrap();

        let names: Vec<String> = reader.list().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, ["a.txt"]);
    }

    #[test]
    fn test_corrupt_tar_is_invalid_archive() {
        let temp = TempDir::new().unwrap();
        let mut data = sample_tar();
        data[148..156].copy_from_slice(b"garbage!");
        let path = write_archive(temp.path(), "bad.tar", &data);
        let mut reader = ArchiveReader::open(&path).unwrap();

        assert!(matches!(
            reader.list(),
            Err(ArchiveError::InvalidArchive(_))
        ));
    }
}
