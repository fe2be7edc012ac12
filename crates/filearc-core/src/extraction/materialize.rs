//! Creating files, directories and symlinks on disk.
//!
//! Callers resolve and vet the destination path first; these helpers only
//! create parents, write, and update the report.

use std::fs::File;
use std::fs::create_dir_all;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;

use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;
use crate::report::ExtractionReport;

/// Creates a directory and any missing parents. Existing directories are
/// merged into.
pub fn create_directory(path: &Path, report: &mut ExtractionReport) -> Result<()> {
    create_dir_all(path)?;
    report.directories_created += 1;
    Ok(())
}

/// Writes a regular file from `reader`, then applies `mode` on Unix.
///
/// Permission bits are set after the content is written so read-only
/// entries can still be filled.
pub fn write_file<R: Read + ?Sized>(
    reader: &mut R,
    path: &Path,
    mode: Option<u32>,
    buffer: &mut CopyBuffer,
    report: &mut ExtractionReport,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::with_capacity(buffer.size(), file);
    let written = copy_with_buffer(reader, &mut writer, buffer)?;
    writer.flush()?;

    #[cfg(unix)]
    if let Some(mode) = mode {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    report.files_extracted += 1;
    report.bytes_written = report.bytes_written.saturating_add(written);

    Ok(())
}

/// Creates a symlink at `link` pointing to `target`, verbatim.
///
/// # Errors
///
/// On platforms without Unix symlinks, returns
/// [`ArchiveError::UnsupportedType`](crate::ArchiveError::UnsupportedType).
#[allow(unused_variables)]
pub fn create_symlink(
    target: &Path,
    link: &Path,
    name: &str,
    report: &mut ExtractionReport,
) -> Result<()> {
    #[cfg(unix)]
    {
        if let Some(parent) = link.parent() {
            create_dir_all(parent)?;
        }
        std::os::unix::fs::symlink(target, link)?;
        report.symlinks_created += 1;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        Err(crate::ArchiveError::UnsupportedType {
            name: name.to_string(),
            kind: "symlink".into(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_create_directory_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let mut report = ExtractionReport::new();
        let dir = temp.path().join("x/y");

        create_directory(&dir, &mut report).unwrap();
        create_directory(&dir, &mut report).unwrap();

        assert!(dir.is_dir());
        assert_eq!(report.directories_created, 2);
    }

    #[test]
    fn test_write_file_creates_parents() {
        let temp = TempDir::new().unwrap();
        let mut report = ExtractionReport::new();
        let path = temp.path().join("deep/nested/file.txt");

        write_file(
            &mut Cursor::new(b"hello"),
            &path,
            Some(0o600),
            &mut CopyBuffer::new(),
            &mut report,
        )
        .unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
        assert_eq!(report.files_extracted, 1);
        assert_eq!(report.bytes_written, 5);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_write_file_read_only_mode() {
        let temp = TempDir::new().unwrap();
        let mut report = ExtractionReport::new();
        let path = temp.path().join("ro.txt");

        write_file(
            &mut Cursor::new(b"locked"),
            &path,
            Some(0o444),
            &mut CopyBuffer::new(),
            &mut report,
        )
        .unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"locked");
    }

    #[cfg(unix)]
    #[test]
    fn test_create_symlink() {
        let temp = TempDir::new().unwrap();
        let mut report = ExtractionReport::new();
        let link = temp.path().join("sub/link");

        create_symlink(Path::new("../target.txt"), &link, "sub/link", &mut report).unwrap();

        assert_eq!(
            std::fs::read_link(&link).unwrap(),
            Path::new("../target.txt")
        );
        assert_eq!(report.symlinks_created, 1);
    }
}
