//! High-level public API: one call per archive operation.

use std::io::Read;
use std::path::Path;
use std::time::Instant;

use crate::ArchiveReader;
use crate::ArchiveWriter;
use crate::CompressOptions;
use crate::CreationReport;
use crate::ExtractOptions;
use crate::ExtractionReport;
use crate::Result;
use crate::types::ArchiveEntry;

/// Archives `source` into `archive`.
///
/// Container and compression come from `options`, or from the archive's
/// extension when unset. With `options.append`, entries are added to an
/// existing uncompressed tar; a missing archive is created instead.
///
/// # Errors
///
/// Returns an error if:
/// - `source` does not exist
/// - bzip2 output is requested, or zip with a compression layer
/// - append is requested on a compressed or zip archive
/// - I/O operations fail
///
/// On error the archive is removed, or for append restored to its original
/// bytes.
///
/// # Examples
///
/// ```no_run
/// use filearc_core::CompressOptions;
/// use filearc_core::compress_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let options = CompressOptions::default().with_include_source_dir(true);
/// let report = compress_archive("backup.tar.gz", "project/", &options)?;
/// println!("Archived {} files", report.files_added);
/// # Ok(())
/// # }
/// ```
pub fn compress_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    archive: P,
    source: Q,
    options: &CompressOptions,
) -> Result<CreationReport> {
    let archive = archive.as_ref();
    let start = Instant::now();

    let mut writer = if options.append && archive.exists() {
        ArchiveWriter::append(archive)?
    } else {
        let (format, compression) = options.resolve_format(archive);
        ArchiveWriter::create(archive, format, compression, options.compression_level)?
    };

    let added = writer.add_tree(
        source.as_ref(),
        options.include_source_dir,
        &options.filter_spec(),
    );
    let closed = writer.close();
    let mut report = added?;
    closed?;

    report.bytes_compressed = std::fs::metadata(archive)?.len();
    report.duration = start.elapsed();

    Ok(report)
}

/// Lists every entry in `archive`, in archive order.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened or decoded.
///
/// # Examples
///
/// ```no_run
/// use filearc_core::list_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// for entry in list_archive("backup.tar.gz")? {
///     println!("{}", entry.name);
/// }
/// # Ok(())
/// # }
/// ```
pub fn list_archive<P: AsRef<Path>>(archive: P) -> Result<Vec<ArchiveEntry>> {
    let mut reader = ArchiveReader::open(archive)?;
    let entries = reader.list()?;
    reader.close()?;
    Ok(entries)
}

/// Extracts `archive` into `target_dir`.
///
/// `options.match_prefix` selects a subtree and strips it from written
/// paths.
///
/// # Errors
///
/// Returns an error if:
/// - the archive cannot be opened or decoded
/// - a non-empty prefix matches no entry
/// - an entry kind cannot be recreated (hard links, devices, FIFOs)
/// - I/O operations fail
///
/// Files written before an error stay on disk.
///
/// # Examples
///
/// ```no_run
/// use filearc_core::ExtractOptions;
/// use filearc_core::extract_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let options = ExtractOptions::default().with_no_override(true);
/// let report = extract_archive("backup.tar.gz", "/tmp/restore", &options)?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    archive: P,
    target_dir: Q,
    options: &ExtractOptions,
) -> Result<ExtractionReport> {
    let mut reader = ArchiveReader::open(archive)?;
    let prefix = options.match_prefix.as_deref().unwrap_or_default();
    let report = reader.extract(prefix, target_dir.as_ref(), options)?;
    reader.close()?;
    Ok(report)
}

/// Reads one entry by name, with the full content for regular files.
///
/// The content is buffered in memory. To stream large entries, use
/// [`ArchiveReader::read_entry`], which returns a reader instead.
///
/// # Errors
///
/// Returns [`ArchiveError::NotFound`](crate::ArchiveError::NotFound) if no
/// entry has that name, or an error if the archive cannot be decoded.
///
/// # Examples
///
/// ```no_run
/// use filearc_core::read_entry;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let (entry, content) = read_entry("backup.tar.gz", "project/README.md")?;
/// if let Some(bytes) = content {
///     println!("{}: {} bytes", entry.name, bytes.len());
/// }
/// # Ok(())
/// # }
/// ```
pub fn read_entry<P: AsRef<Path>>(
    archive: P,
    name: &str,
) -> Result<(ArchiveEntry, Option<Vec<u8>>)> {
    let mut reader = ArchiveReader::open(archive)?;

    let (entry, content) = {
        let (entry, stream) = reader.read_entry(name)?;
        let content = match stream {
            Some(mut stream) => {
                let mut buf = Vec::with_capacity(usize::try_from(entry.size).unwrap_or(0));
                stream.read_to_end(&mut buf)?;
                Some(buf)
            }
            None => None,
        };
        (entry, content)
    };

    reader.close()?;
    Ok((entry, content))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ArchiveError;
    use crate::CompressionKind;
    use crate::ContainerFormat;
    use crate::test_utils::create_fixture_tree;
    use tempfile::TempDir;

    #[test]
    fn test_compress_uses_extension_defaults() {
        let temp = TempDir::new().unwrap();
        let input = create_fixture_tree(temp.path());
        let archive = temp.path().join("out.tgz");

        let report = compress_archive(&archive, &input, &CompressOptions::default()).unwrap();
        assert_eq!(report.files_added, 4);
        assert!(report.bytes_compressed > 0);

        let reader = ArchiveReader::open(&archive).unwrap();
        assert_eq!(reader.compression(), CompressionKind::Gzip);
        assert_eq!(reader.format(), ContainerFormat::Tar);
    }

    #[test]
    fn test_compress_bzip2_leaves_nothing() {
        let temp = TempDir::new().unwrap();
        let input = create_fixture_tree(temp.path());
        let archive = temp.path().join("out.tar.bz2");

        let err = compress_archive(&archive, &input, &CompressOptions::default()).unwrap_err();
        assert!(matches!(err, ArchiveError::Bzip2WriteNotSupported));
        assert!(!archive.exists());
    }

    #[test]
    fn test_compress_append_to_missing_archive_creates_it() {
        let temp = TempDir::new().unwrap();
        let input = create_fixture_tree(temp.path());
        let archive = temp.path().join("new.tar");

        let options = CompressOptions::default().with_append(true);
        compress_archive(&archive, input.join("a.txt"), &options).unwrap();

        let names: Vec<_> = list_archive(&archive)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, ["a.txt"]);
    }

    #[test]
    fn test_read_entry_returns_content() {
        let temp = TempDir::new().unwrap();
        let input = create_fixture_tree(temp.path());
        let archive = temp.path().join("out.zip");
        compress_archive(&archive, &input, &CompressOptions::default()).unwrap();

        let (entry, content) = read_entry(&archive, "c/c1.txt").unwrap();
        assert_eq!(entry.size, 6);
        assert_eq!(content.unwrap(), b"c1.txt");

        let (entry, content) = read_entry(&archive, "d").unwrap();
        assert!(entry.entry_type.is_directory());
        assert!(content.is_none());
    }

    #[test]
    fn test_extract_archive_uses_match_prefix() {
        let temp = TempDir::new().unwrap();
        let input = create_fixture_tree(temp.path());
        let archive = temp.path().join("out.tar");
        let options = CompressOptions::default().with_include_source_dir(true);
        compress_archive(&archive, &input, &options).unwrap();

        let out = temp.path().join("out");
        let options = ExtractOptions::default().with_match_prefix("input/c");
        let report = extract_archive(&archive, &out, &options).unwrap();

        assert_eq!(report.files_extracted, 2);
        assert!(out.join("c1.txt").is_file());
        assert!(!out.join("input").exists());
    }
}
