//! Compression layer: one encoder or decoder chosen per session.
//!
//! Gzip is supported in both directions. Bzip2 is decode-only; a session
//! asked to write bzip2 is refused before any file is created.
//!
//! # Level Mapping
//!
//! User levels follow a consistent 1-9 scale:
//!
//! - **1-3**: Fast compression
//! - **6** or unset: Default compression
//! - **7-9**: Best compression

use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;

use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

use super::detect::CompressionKind;
use crate::ArchiveError;
use crate::Result;

/// Converts a user compression level (1-9) to a flate2 level.
///
/// # Examples
///
/// ```
/// use filearc_core::formats::compression::compression_level_to_flate2;
///
/// assert_eq!(compression_level_to_flate2(None), flate2::Compression::default());
/// assert_eq!(compression_level_to_flate2(Some(1)), flate2::Compression::fast());
/// assert_eq!(compression_level_to_flate2(Some(9)), flate2::Compression::best());
/// ```
#[must_use]
pub fn compression_level_to_flate2(level: Option<u8>) -> flate2::Compression {
    match level {
        None | Some(6) => flate2::Compression::default(),
        Some(1..=3) => flate2::Compression::fast(),
        Some(7..=9) => flate2::Compression::best(),
        Some(n) => flate2::Compression::new(u32::from(n.min(9))),
    }
}

/// Converts a user compression level (1-9) to a zip deflate level.
///
/// Level 0 means "store without compression" and maps to `None`, which
/// callers translate into [`zip::CompressionMethod::Stored`].
#[must_use]
pub fn compression_level_to_zip(level: Option<u8>) -> Option<i64> {
    match level {
        Some(0) => None,
        None => Some(6),
        Some(n) => Some(i64::from(n.min(9))),
    }
}

/// Write side of the compression layer.
#[derive(Debug)]
pub enum Encoder<W: Write> {
    /// Bytes pass through unchanged.
    Plain(W),
    /// Gzip stream.
    Gzip(GzEncoder<W>),
}

impl<W: Write> Encoder<W> {
    /// Wraps `inner` in the encoder for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Bzip2WriteNotSupported`] for bzip2.
    pub fn new(inner: W, kind: CompressionKind, level: Option<u8>) -> Result<Self> {
        match kind {
            CompressionKind::Uncompressed => Ok(Self::Plain(inner)),
            CompressionKind::Gzip => Ok(Self::Gzip(GzEncoder::new(
                inner,
                compression_level_to_flate2(level),
            ))),
            CompressionKind::Bzip2 => Err(ArchiveError::Bzip2WriteNotSupported),
        }
    }

    /// Writes the compression trailer and returns the inner writer.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if flushing the compressed stream fails.
    pub fn finish(self) -> io::Result<W> {
        match self {
            Self::Plain(inner) => Ok(inner),
            Self::Gzip(encoder) => encoder.finish(),
        }
    }
}

impl<W: Write> Write for Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(inner) => inner.write(buf),
            Self::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(inner) => inner.flush(),
            Self::Gzip(encoder) => encoder.flush(),
        }
    }
}

/// Read side of the compression layer.
///
/// Gzip and bzip2 decoders accept concatenated members, like `gzip -d`.
pub enum Decoder {
    /// Bytes pass through unchanged.
    Plain(BufReader<File>),
    /// Gzip stream.
    Gzip(MultiGzDecoder<BufReader<File>>),
    /// Bzip2 stream.
    Bzip2(MultiBzDecoder<BufReader<File>>),
}

impl Decoder {
    /// Wraps an opened archive file in the decoder for `kind`.
    ///
    /// The file must be positioned at the start of the compressed stream.
    #[must_use]
    pub fn new(file: File, kind: CompressionKind) -> Self {
        let reader = BufReader::new(file);
        match kind {
            CompressionKind::Uncompressed => Self::Plain(reader),
            CompressionKind::Gzip => Self::Gzip(MultiGzDecoder::new(reader)),
            CompressionKind::Bzip2 => Self::Bzip2(MultiBzDecoder::new(reader)),
        }
    }

    /// Returns the compression kind this decoder undoes.
    #[must_use]
    pub const fn kind(&self) -> CompressionKind {
        match self {
            Self::Plain(_) => CompressionKind::Uncompressed,
            Self::Gzip(_) => CompressionKind::Gzip,
            Self::Bzip2(_) => CompressionKind::Bzip2,
        }
    }
}

impl std::fmt::Debug for Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Decoder").field(&self.kind()).finish()
    }
}

impl Read for Decoder {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(reader) => reader.read(buf),
            Self::Gzip(decoder) => decoder.read(buf),
            Self::Bzip2(decoder) => decoder.read(buf),
        }
    }
}
