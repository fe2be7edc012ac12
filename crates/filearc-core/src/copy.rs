//! Entry content copying with a reusable buffer.
//!
//! One [`CopyBuffer`] is allocated per extraction run and shared by every
//! file written in it.

use std::io;
use std::io::Read;
use std::io::Write;

use crate::Result;

/// Buffer size for content copies (64KB).
///
/// Matches typical filesystem block sizes.
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Heap buffer reused across content copies.
///
/// # Examples
///
/// ```
/// use filearc_core::copy::CopyBuffer;
/// use filearc_core::copy::copy_with_buffer;
/// use std::io::Cursor;
///
/// let mut buffer = CopyBuffer::new();
/// let mut output = Vec::new();
///
/// let copied = copy_with_buffer(&mut Cursor::new(b"content"), &mut output, &mut buffer)?;
/// assert_eq!(copied, 7);
/// assert_eq!(output, b"content");
/// # Ok::<(), filearc_core::ArchiveError>(())
/// ```
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Box<[u8]>,
}

impl CopyBuffer {
    /// Allocates a zeroed copy buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; COPY_BUFFER_SIZE].into_boxed_slice(),
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies `reader` to `writer` through `buffer`, returning the byte count.
///
/// Interrupted reads are retried.
///
/// # Errors
///
/// Returns an I/O error if reading or writing fails.
pub fn copy_with_buffer<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
) -> Result<u64> {
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        writer.write_all(&buffer.buf[..bytes_read])?;
        total = total.saturating_add(bytes_read as u64);
    }

    Ok(total)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ArchiveError;
    use std::io::Cursor;

    #[test]
    fn test_copy_buffer_size() {
        assert_eq!(CopyBuffer::default().size(), COPY_BUFFER_SIZE);
    }

    #[test]
    fn test_copy_empty_source() {
        let mut buffer = CopyBuffer::new();
        let mut output = Vec::new();

        let copied = copy_with_buffer(&mut io::empty(), &mut output, &mut buffer).unwrap();
        assert_eq!(copied, 0);
        assert!(output.is_empty());
    }

    #[test]
    fn test_copy_spans_multiple_chunks() {
        let mut buffer = CopyBuffer::new();
        let input: Vec<u8> = (0..COPY_BUFFER_SIZE * 2 + 17)
            .map(|i| (i % 251) as u8)
            .collect();
        let mut output = Vec::new();

        let copied = copy_with_buffer(&mut Cursor::new(&input), &mut output, &mut buffer).unwrap();
        assert_eq!(copied, input.len() as u64);
        assert_eq!(output, input);
    }

    #[test]
    fn test_copy_retries_interrupted_reads() {
        struct FlakyReader {
            remaining: usize,
            interrupted: bool,
        }

        impl Read for FlakyReader {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if !self.interrupted {
                    self.interrupted = true;
                    return Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted"));
                }
                self.interrupted = false;
                let n = self.remaining.min(buf.len()).min(100);
                buf[..n].fill(b'z');
                self.remaining -= n;
                Ok(n)
            }
        }

        let mut reader = FlakyReader {
            remaining: 1000,
            interrupted: false,
        };
        let mut output = Vec::new();

        let copied = copy_with_buffer(&mut reader, &mut output, &mut CopyBuffer::new()).unwrap();
        assert_eq!(copied, 1000);
        assert!(output.iter().all(|&b| b == b'z'));
    }

    #[test]
    fn test_copy_propagates_write_failure() {
        struct FullDisk;

        impl Write for FullDisk {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("no space left"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let result = copy_with_buffer(
            &mut Cursor::new(vec![1u8; 10]),
            &mut FullDisk,
            &mut CopyBuffer::new(),
        );
        assert!(matches!(result, Err(ArchiveError::Io(_))));
    }
}
