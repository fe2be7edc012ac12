//! Tar entry codec.
//!
//! Headers are written in GNU format, which lets the `tar` crate store long
//! names and link targets through its GNU extension records. On the read
//! side the crate folds those records (and pax extensions) into the entry
//! they describe; only pax global headers surface and are skipped here.

use std::io;
use std::io::Read;
use std::io::Write;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use tar::Builder;
use tar::Header;

use crate::ArchiveError;
use crate::Result;
use crate::types::ArchiveEntry;
use crate::types::EntryType;
use crate::types::normalize_entry_name;

/// Permission bits used when an entry carries no mode.
const DEFAULT_FILE_MODE: u32 = 0o644;
const DEFAULT_DIR_MODE: u32 = 0o755;
const DEFAULT_LINK_MODE: u32 = 0o777;

/// Writes one entry, streaming `content` for regular files.
///
/// File entries must carry the exact content length in `entry.size`; a file
/// entry without content is written empty. Returns the number of content
/// bytes stored.
///
/// # Errors
///
/// Returns [`ArchiveError::UnsupportedType`] for kinds tar writing does not
/// handle, or an I/O error from the underlying writer. Content that ends
/// before or runs past `entry.size` fails with an I/O error after the header
/// is written, so the archive must be discarded.
pub fn write_entry<W: Write>(
    builder: &mut Builder<W>,
    entry: &ArchiveEntry,
    content: Option<&mut dyn Read>,
) -> Result<u64> {
    let mut header = Header::new_gnu();
    header.set_mtime(unix_seconds(entry.modified));

    match &entry.entry_type {
        EntryType::File => {
            header.set_entry_type(tar::EntryType::Regular);
            header.set_mode(entry.mode.unwrap_or(DEFAULT_FILE_MODE));

            match content {
                Some(reader) => {
                    header.set_size(entry.size);
                    let content = ExactLen::new(reader, &entry.name, entry.size);
                    builder.append_data(&mut header, &entry.name, content)?;
                    Ok(entry.size)
                }
                None => {
                    header.set_size(0);
                    builder.append_data(&mut header, &entry.name, io::empty())?;
                    Ok(0)
                }
            }
        }
        EntryType::Directory => {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_mode(entry.mode.unwrap_or(DEFAULT_DIR_MODE));
            header.set_size(0);
            builder.append_data(&mut header, format!("{}/", entry.name), io::empty())?;
            Ok(0)
        }
        EntryType::Symlink { target } => {
            header.set_entry_type(tar::EntryType::Symlink);
            header.set_mode(entry.mode.unwrap_or(DEFAULT_LINK_MODE));
            header.set_size(0);
            builder.append_link(&mut header, &entry.name, target)?;
            Ok(0)
        }
        EntryType::Unsupported { kind } => Err(ArchiveError::UnsupportedType {
            name: entry.name.clone(),
            kind: (*kind).to_string(),
        }),
    }
}

/// Converts a decoded tar entry into an [`ArchiveEntry`].
///
/// Returns `Ok(None)` for pax global headers, which describe the archive
/// rather than a file-system object, and for the archive root itself (`./`,
/// as written by `tar -C dir .`).
///
/// # Errors
///
/// Returns [`ArchiveError::InvalidArchive`] if the header is corrupt.
pub fn read_entry<R: Read>(entry: &tar::Entry<'_, R>) -> Result<Option<ArchiveEntry>> {
    let header = entry.header();
    let raw_type = header.entry_type();

    if raw_type == tar::EntryType::XGlobalHeader {
        return Ok(None);
    }

    let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
    if normalize_entry_name(&name).is_empty() {
        return Ok(None);
    }

    let entry_type = match raw_type {
        tar::EntryType::Regular | tar::EntryType::Continuous => EntryType::File,
        tar::EntryType::Directory => EntryType::Directory,
        tar::EntryType::Symlink => {
            let target = entry
                .link_name()
                .map_err(|e| ArchiveError::InvalidArchive(format!("invalid link target: {e}")))?
                .ok_or_else(|| {
                    ArchiveError::InvalidArchive(format!("symlink {name} has no target"))
                })?;
            EntryType::Symlink {
                target: target.into_owned(),
            }
        }
        other => EntryType::Unsupported {
            kind: unsupported_kind(other),
        },
    };

    let mut archive_entry = ArchiveEntry::new(&name, entry_type);
    archive_entry.size = if archive_entry.entry_type.is_file() {
        entry.size()
    } else {
        0
    };
    archive_entry.mode = header.mode().ok().map(|mode| mode & 0o7777);
    archive_entry.modified = header
        .mtime()
        .ok()
        .and_then(|secs| UNIX_EPOCH.checked_add(Duration::from_secs(secs)));
    archive_entry.offset = entry.raw_file_position();

    Ok(Some(archive_entry))
}

/// Yields the `expected` bytes the header declares and fails if the inner
/// reader holds fewer or more. The `tar` crate pads to the bytes it copied,
/// so any mismatch would misalign every following header.
struct ExactLen<'n, R> {
    inner: R,
    name: &'n str,
    expected: u64,
    remaining: u64,
}

impl<'n, R: Read> ExactLen<'n, R> {
    fn new(inner: R, name: &'n str, expected: u64) -> Self {
        Self {
            inner,
            name,
            expected,
            remaining: expected,
        }
    }
}

impl<R: Read> Read for ExactLen<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        if self.remaining == 0 {
            let mut extra = [0u8; 1];
            return match self.inner.read(&mut extra)? {
                0 => Ok(0),
                _ => Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "{}: content is longer than the declared {} bytes",
                        self.name, self.expected
                    ),
                )),
            };
        }

        let limit = usize::try_from(self.remaining).map_or(buf.len(), |r| r.min(buf.len()));
        let read = self.inner.read(&mut buf[..limit])?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "{}: content ended after {} of the declared {} bytes",
                    self.name,
                    self.expected - self.remaining,
                    self.expected
                ),
            ));
        }

        self.remaining -= read as u64;
        Ok(read)
    }
}

fn unsupported_kind(entry_type: tar::EntryType) -> &'static str {
    match entry_type {
        tar::EntryType::Link => "hard link",
        tar::EntryType::Char => "character device",
        tar::EntryType::Block => "block device",
        tar::EntryType::Fifo => "fifo",
        tar::EntryType::GNUSparse => "sparse file",
        _ => "unknown",
    }
}

/// Seconds since the Unix epoch, clamped to zero for earlier or unset times.
fn unix_seconds(time: Option<SystemTime>) -> u64 {
    time.and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_secs())
}
