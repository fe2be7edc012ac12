//! Archive format detection.
//!
//! Compression is identified from magic bytes, never from the file name,
//! so a misnamed `.tar` that is really gzip is still read correctly. File
//! extensions are only used to pick defaults when creating an archive.

use std::fmt;
use std::io;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;

/// Gzip member header: magic `1F 8B` followed by the deflate method byte.
const GZIP_MAGIC: [u8; 3] = [0x1F, 0x8B, 0x08];

/// Bzip2 stream header: `BZh`.
const BZIP2_MAGIC: [u8; 3] = [0x42, 0x5A, 0x68];

/// Zip record signatures that can start a file: local file header,
/// end of central directory (empty archive) and spanning marker.
const ZIP_SIGNATURES: [[u8; 4]; 3] = [
    [0x50, 0x4B, 0x03, 0x04],
    [0x50, 0x4B, 0x05, 0x06],
    [0x50, 0x4B, 0x07, 0x08],
];

/// Number of leading bytes inspected by the sniffers.
const SNIFF_LEN: usize = 4;

/// Compression layer wrapping the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompressionKind {
    /// No compression layer.
    #[default]
    Uncompressed,
    /// Gzip (deflate) compression.
    Gzip,
    /// Bzip2 compression (decode only).
    Bzip2,
}

impl CompressionKind {
    /// Returns a human-readable name for this compression kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use filearc_core::CompressionKind;
    ///
    /// assert_eq!(CompressionKind::Gzip.name(), "gzip");
    /// assert_eq!(CompressionKind::Uncompressed.name(), "none");
    /// ```
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uncompressed => "none",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
        }
    }
}

impl fmt::Display for CompressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Container layer: the structure that sequences entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContainerFormat {
    /// POSIX/GNU tar.
    #[default]
    Tar,
    /// PKWARE zip.
    Zip,
}

impl ContainerFormat {
    /// Returns a human-readable name for this container format.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::Zip => "zip",
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifies the compression layer from the leading bytes of `reader`.
///
/// The read position is restored to where it was before the call. A short
/// or empty stream is reported as uncompressed.
///
/// # Errors
///
/// Returns an error only if reading or seeking fails.
///
/// # Examples
///
/// ```
/// use filearc_core::CompressionKind;
/// use filearc_core::formats::detect::detect_compression;
/// use std::io::Cursor;
///
/// let mut gz = Cursor::new(vec![0x1F, 0x8B, 0x08, 0x00, 0xFF]);
/// assert_eq!(detect_compression(&mut gz)?, CompressionKind::Gzip);
/// assert_eq!(gz.position(), 0);
///
/// let mut empty = Cursor::new(Vec::new());
/// assert_eq!(detect_compression(&mut empty)?, CompressionKind::Uncompressed);
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn detect_compression<R: Read + Seek>(reader: &mut R) -> io::Result<CompressionKind> {
    let (magic, len) = peek_magic(reader)?;
    let head = &magic[..len];

    let kind = if head.starts_with(&GZIP_MAGIC) {
        CompressionKind::Gzip
    } else if head.starts_with(&BZIP2_MAGIC) {
        CompressionKind::Bzip2
    } else {
        CompressionKind::Uncompressed
    };

    Ok(kind)
}

/// Classifies an uncompressed container as zip or tar.
///
/// Uses the same position-restoring peek as [`detect_compression`]. Anything
/// that does not start with a zip signature is treated as tar.
///
/// # Errors
///
/// Returns an error only if reading or seeking fails.
pub fn detect_container<R: Read + Seek>(reader: &mut R) -> io::Result<ContainerFormat> {
    let (magic, len) = peek_magic(reader)?;

    if is_zip_signature(&magic[..len]) {
        Ok(ContainerFormat::Zip)
    } else {
        Ok(ContainerFormat::Tar)
    }
}

/// Returns `true` if `head` is one of the zip record signatures.
#[must_use]
pub fn is_zip_signature(head: &[u8]) -> bool {
    ZIP_SIGNATURES.iter().any(|signature| head == signature)
}

/// Reads up to [`SNIFF_LEN`] bytes and seeks back to the starting position.
fn peek_magic<R: Read + Seek>(reader: &mut R) -> io::Result<([u8; SNIFF_LEN], usize)> {
    let start = reader.stream_position()?;
    let mut magic = [0u8; SNIFF_LEN];
    let mut filled = 0;

    while filled < SNIFF_LEN {
        match reader.read(&mut magic[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    reader.seek(SeekFrom::Start(start))?;
    Ok((magic, filled))
}

/// Derives the default container and compression from a file name.
///
/// Returns `None` for extensions that do not name an archive, in which case
/// callers fall back to an uncompressed tar.
///
/// # Examples
///
/// ```
/// use filearc_core::CompressionKind;
/// use filearc_core::ContainerFormat;
/// use filearc_core::formats::detect::detect_format;
/// use std::path::Path;
///
/// assert_eq!(
///     detect_format(Path::new("backup.tgz")),
///     Some((ContainerFormat::Tar, CompressionKind::Gzip))
/// );
/// assert_eq!(
///     detect_format(Path::new("bundle.ZIP")),
///     Some((ContainerFormat::Zip, CompressionKind::Uncompressed))
/// );
/// assert_eq!(detect_format(Path::new("notes.txt")), None);
/// ```
#[must_use]
pub fn detect_format(path: &Path) -> Option<(ContainerFormat, CompressionKind)> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();

    match extension.as_str() {
        "tar" => Some((ContainerFormat::Tar, CompressionKind::Uncompressed)),
        "gz" | "tgz" => Some((ContainerFormat::Tar, CompressionKind::Gzip)),
        "bz2" | "tbz" | "tbz2" => Some((ContainerFormat::Tar, CompressionKind::Bzip2)),
        "zip" => Some((ContainerFormat::Zip, CompressionKind::Uncompressed)),
        _ => None,
    }
}
