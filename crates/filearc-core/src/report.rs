//! Operation reporting for archive creation and extraction.

use std::time::Duration;

/// Report of an archive creation or append operation.
///
/// # Examples
///
/// ```
/// use filearc_core::CreationReport;
///
/// let mut report = CreationReport::default();
/// report.files_added = 10;
/// report.bytes_written = 1024;
/// report.bytes_compressed = 512;
///
/// assert_eq!(report.compression_ratio(), 2.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreationReport {
    /// Number of regular files added.
    pub files_added: usize,

    /// Number of directories added.
    pub directories_added: usize,

    /// Number of symlinks added.
    pub symlinks_added: usize,

    /// Content bytes stored (uncompressed).
    pub bytes_written: u64,

    /// Size of the archive file after closing.
    pub bytes_compressed: u64,

    /// Objects found during the walk but not stored (sockets, FIFOs,
    /// device nodes).
    pub entries_skipped: usize,

    /// Duration of the operation.
    pub duration: Duration,
}

impl CreationReport {
    /// Creates a new empty creation report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns total number of entries written.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_added + self.directories_added + self.symlinks_added
    }

    /// Returns the compression ratio (uncompressed / compressed).
    ///
    /// Returns 0.0 if either side is 0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_compressed == 0 || self.bytes_written == 0 {
            return 0.0;
        }
        self.bytes_written as f64 / self.bytes_compressed as f64
    }
}

/// Report of an archive extraction operation.
///
/// Extraction stops at the first error, so a report is only returned for a
/// completed run; entries written before a failure stay on disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionReport {
    /// Number of files written.
    pub files_extracted: usize,

    /// Number of directories created or merged.
    pub directories_created: usize,

    /// Number of symlinks created.
    pub symlinks_created: usize,

    /// Entries deliberately not written: existing files kept under the
    /// no-override policy and entries refused by containment checks.
    pub files_skipped: usize,

    /// Total content bytes written to disk.
    pub bytes_written: u64,

    /// Duration of the operation.
    pub duration: Duration,

    /// One message per entry refused by containment checks.
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    /// Creates a new empty extraction report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Returns total number of items materialized.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_extracted + self.directories_created + self.symlinks_created
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
