//! Zip entry codec.
//!
//! Directories are stored with a trailing `/`. Symlinks are stored the way
//! Info-ZIP does it: unix mode bits of type `S_IFLNK` in the external
//! attributes and the link target as the entry content.

use std::io;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use std::path::PathBuf;
use std::time::SystemTime;

use chrono::NaiveDateTime;
use chrono::Utc;
use zip::CompressionMethod;
use zip::DateTime;
use zip::ZipWriter;
use zip::read::ZipFile;
use zip::write::SimpleFileOptions;

use super::compression::compression_level_to_zip;
use crate::ArchiveError;
use crate::Result;
use crate::error::zip_error;
use crate::types::ArchiveEntry;
use crate::types::EntryType;

const S_IFMT: u32 = 0o170_000;
const S_IFLNK: u32 = 0o120_000;

/// Builds per-entry options: deflate at `level` (stored for level 0), plus
/// the entry's permission bits and modification time when present.
#[must_use]
pub fn file_options(entry: &ArchiveEntry, level: Option<u8>) -> SimpleFileOptions {
    let options = match compression_level_to_zip(level) {
        None => SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
        Some(level) => SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(level)),
    };

    let options = match entry.mode {
        Some(mode) => options.unix_permissions(mode),
        None => options,
    };

    match entry.modified.and_then(to_zip_datetime) {
        Some(modified) => options.last_modified_time(modified),
        None => options,
    }
}

/// Writes one entry, streaming `content` for regular files.
///
/// Returns the number of content bytes stored.
///
/// # Errors
///
/// Returns [`ArchiveError::UnsupportedType`] for kinds zip writing does not
/// handle, or an error from the zip writer.
pub fn write_entry<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    entry: &ArchiveEntry,
    content: Option<&mut dyn Read>,
    level: Option<u8>,
) -> Result<u64> {
    let options = file_options(entry, level);

    match &entry.entry_type {
        EntryType::File => {
            zip.start_file(entry.name.clone(), options)
                .map_err(zip_error)?;
            match content {
                Some(reader) => Ok(io::copy(reader, zip)?),
                None => Ok(0),
            }
        }
        EntryType::Directory => {
            zip.add_directory(format!("{}/", entry.name), options)
                .map_err(zip_error)?;
            Ok(0)
        }
        EntryType::Symlink { target } => {
            zip.add_symlink(
                entry.name.clone(),
                target.to_string_lossy().into_owned(),
                options,
            )
            .map_err(zip_error)?;
            Ok(0)
        }
        EntryType::Unsupported { kind } => Err(ArchiveError::UnsupportedType {
            name: entry.name.clone(),
            kind: (*kind).to_string(),
        }),
    }
}

/// Converts a zip file record into an [`ArchiveEntry`].
///
/// For symlinks the target is read from the entry content, which leaves the
/// record's stream consumed.
///
/// # Errors
///
/// Returns an I/O error if a symlink target cannot be read.
pub fn read_entry<R: Read + Seek>(file: &mut ZipFile<'_, R>) -> Result<ArchiveEntry> {
    let unix_mode = file.unix_mode();
    let is_symlink = unix_mode.is_some_and(|mode| mode & S_IFMT == S_IFLNK);

    let entry_type = if file.is_dir() {
        EntryType::Directory
    } else if is_symlink {
        let mut target = String::new();
        file.read_to_string(&mut target).map_err(|e| {
            ArchiveError::InvalidArchive(format!(
                "invalid symlink target for {}: {e}",
                file.name()
            ))
        })?;
        EntryType::Symlink {
            target: PathBuf::from(target),
        }
    } else {
        EntryType::File
    };

    let mut entry = ArchiveEntry::new(file.name(), entry_type);
    entry.size = if entry.entry_type.is_file() {
        file.size()
    } else {
        0
    };
    entry.mode = unix_mode.map(|mode| mode & 0o7777);
    entry.modified = file.last_modified().and_then(from_zip_datetime);
    entry.offset = file.header_start();

    Ok(entry)
}

/// Converts to an MS-DOS timestamp (UTC). Times outside 1980-2107 have no
/// representation and yield `None`.
fn to_zip_datetime(time: SystemTime) -> Option<DateTime> {
    let utc: chrono::DateTime<Utc> = time.into();
    DateTime::try_from(utc.naive_utc()).ok()
}

fn from_zip_datetime(datetime: DateTime) -> Option<SystemTime> {
    let naive = NaiveDateTime::try_from(datetime).ok()?;
    Some(naive.and_utc().into())
}
