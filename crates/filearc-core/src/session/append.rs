//! Locating the end-of-archive marker of an existing tar file.
//!
//! A tar stream ends with at least two 512-byte zero blocks, often followed
//! by more zero padding up to the writer's record size. New entries go where
//! the first of those zero blocks starts, which is found by walking the
//! headers rather than assuming the marker sits in the last 1024 bytes.

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;

use crate::ArchiveError;
use crate::Result;
use crate::formats::CompressionKind;
use crate::formats::ContainerFormat;
use crate::formats::detect::detect_compression;
use crate::formats::detect::detect_container;

const BLOCK_SIZE: u64 = 512;

/// Size of the end-of-archive marker: two zero blocks.
pub const END_MARKER_SIZE: u64 = 2 * BLOCK_SIZE;

/// An archive opened for appending, positioned at its end-of-archive marker.
#[derive(Debug)]
pub struct AppendPoint {
    /// Archive file, opened read-write and positioned at `offset`.
    pub file: File,

    /// Where the end-of-archive marker starts.
    pub offset: u64,

    /// File length before anything was appended.
    pub original_len: u64,
}

/// Opens `path` for appending.
///
/// # Errors
///
/// - [`ArchiveError::AppendNotSupported`] if the archive is compressed or is
///   a zip file. The file is not modified.
/// - [`ArchiveError::InvalidArchive`] if the tar headers cannot be walked or
///   the archive does not end with two zero blocks.
/// - I/O errors from opening or reading the file.
pub fn open_for_append(path: &Path) -> Result<AppendPoint> {
    let mut file = OpenOptions::new().read(true).write(true).open(path)?;

    let compression = detect_compression(&mut file)?;
    if compression != CompressionKind::Uncompressed {
        return Err(ArchiveError::AppendNotSupported {
            path: path.to_path_buf(),
            reason: format!("archive is {compression}-compressed"),
        });
    }

    if detect_container(&mut file)? == ContainerFormat::Zip {
        return Err(ArchiveError::AppendNotSupported {
            path: path.to_path_buf(),
            reason: "zip archives cannot be appended to".into(),
        });
    }

    let original_len = file.metadata()?.len();
    let offset = end_of_entries(&file)?;

    if original_len.saturating_sub(offset) < END_MARKER_SIZE {
        return Err(ArchiveError::InvalidArchive(format!(
            "{} has no end-of-archive marker",
            path.display()
        )));
    }

    file.seek(SeekFrom::Start(offset))?;
    if !is_zero_filled(&mut file)? {
        return Err(ArchiveError::InvalidArchive(format!(
            "{} has trailing data after the end-of-archive marker",
            path.display()
        )));
    }

    file.seek(SeekFrom::Start(offset))?;

    Ok(AppendPoint {
        file,
        offset,
        original_len,
    })
}

/// Returns the offset just past the last entry's padded data.
fn end_of_entries(file: &File) -> Result<u64> {
    let mut archive = tar::Archive::new(file);
    let mut end = 0u64;

    for entry in archive
        .entries()
        .map_err(|e| ArchiveError::InvalidArchive(format!("failed to read tar headers: {e}")))?
    {
        let entry = entry
            .map_err(|e| ArchiveError::InvalidArchive(format!("failed to read tar entry: {e}")))?;
        let stored = entry
            .header()
            .entry_size()
            .map_err(|e| ArchiveError::InvalidArchive(format!("invalid entry size: {e}")))?;
        end = entry.raw_file_position() + stored.div_ceil(BLOCK_SIZE) * BLOCK_SIZE;
    }

    Ok(end)
}

fn is_zero_filled<R: Read>(reader: &mut R) -> io::Result<bool> {
    let mut buf = [0u8; BLOCK_SIZE as usize];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(true),
            Ok(n) => {
                if buf[..n].iter().any(|&b| b != 0) {
                    return Ok(false);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::TarTestBuilder;
    use crate::test_utils::ZipTestBuilder;
    use crate::test_utils::write_archive;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_append_point_of_builder_output() {
        let temp = TempDir::new().unwrap();
        let data = TarTestBuilder::new().add_file("a.txt", b"a.txt").build();
        let path = write_archive(temp.path(), "out.tar", &data);

        let point = open_for_append(&path).unwrap();
        assert_eq!(point.original_len, data.len() as u64);
        assert_eq!(point.offset, 1024);
        assert_eq!(point.original_len - point.offset, END_MARKER_SIZE);
    }

    #[test]
    fn test_append_point_with_record_padding() {
        let temp = TempDir::new().unwrap();
        let mut data = TarTestBuilder::new().add_file("a.txt", b"a.txt").build();
        data.resize(10240, 0);
        let path = write_archive(temp.path(), "padded.tar", &data);

        let point = open_for_append(&path).unwrap();
        assert_eq!(point.offset, 1024);
        assert_eq!(point.original_len, 10240);
    }

    #[test]
    fn test_append_point_of_empty_archive() {
        let temp = TempDir::new().unwrap();
        let path = write_archive(temp.path(), "empty.tar", &[0u8; 1024]);

        assert_eq!(open_for_append(&path).unwrap().offset, 0);
    }

    #[test]
    fn test_append_refuses_gzip() {
        let temp = TempDir::new().unwrap();
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&TarTestBuilder::new().add_file("a", b"a").build())
            .unwrap();
        let path = write_archive(temp.path(), "out.tar.gz", &encoder.finish().unwrap());

        let err = open_for_append(&path).unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::AppendNotSupported { ref reason, .. } if reason.contains("gzip")
        ));
    }

    #[test]
    fn test_append_refuses_zip() {
        let temp = TempDir::new().unwrap();
        let data = ZipTestBuilder::new().add_file("a.txt", b"a").build();
        let path = write_archive(temp.path(), "out.zip", &data);

        assert!(matches!(
            open_for_append(&path),
            Err(ArchiveError::AppendNotSupported { .. })
        ));
    }

    #[test]
    fn test_append_requires_end_marker() {
        let temp = TempDir::new().unwrap();
        let mut data = TarTestBuilder::new().add_file("a.txt", b"a.txt").build();
        data.truncate(1024);
        let path = write_archive(temp.path(), "cut.tar", &data);

        assert!(matches!(
            open_for_append(&path),
            Err(ArchiveError::InvalidArchive(_))
        ));
    }
}
