//! Options for archive creation and extraction.

use std::path::Path;

use crate::filter::FilterSpec;
use crate::formats::CompressionKind;
use crate::formats::ContainerFormat;
use crate::formats::detect::detect_format;

/// Options for [`compress_archive`](crate::compress_archive).
///
/// # Examples
///
/// ```
/// use filearc_core::CompressOptions;
/// use filearc_core::CompressionKind;
///
/// let options = CompressOptions::default()
///     .with_compression(CompressionKind::Gzip)
///     .with_include_source_dir(true)
///     .with_filters(vec!["src".to_string()]);
///
/// assert_eq!(options.compression, Some(CompressionKind::Gzip));
/// assert!(!options.append);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressOptions {
    /// Append to an existing uncompressed tar instead of creating a new
    /// archive.
    ///
    /// Default: `false`.
    pub append: bool,

    /// Compression layer. `None` derives it from the archive extension.
    ///
    /// Default: `None`.
    pub compression: Option<CompressionKind>,

    /// Container format. `None` derives it from the archive extension,
    /// falling back to tar.
    ///
    /// Default: `None`.
    pub format: Option<ContainerFormat>,

    /// Store the source directory's own name as the first path segment.
    ///
    /// Default: `false`.
    pub include_source_dir: bool,

    /// Inclusion filters, in platform path syntax. Empty stores everything.
    ///
    /// Default: empty.
    pub filters: Vec<String>,

    /// Compression level on the 1-9 scale (0 stores zip entries without
    /// compression). `None` uses the codec default.
    ///
    /// Default: `None`.
    pub compression_level: Option<u8>,
}

impl CompressOptions {
    /// Creates options with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets append mode.
    #[must_use]
    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    /// Sets the compression layer.
    #[must_use]
    pub fn with_compression(mut self, compression: CompressionKind) -> Self {
        self.compression = Some(compression);
        self
    }

    /// Sets the container format.
    #[must_use]
    pub fn with_format(mut self, format: ContainerFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Sets whether the source directory name is stored.
    #[must_use]
    pub fn with_include_source_dir(mut self, include: bool) -> Self {
        self.include_source_dir = include;
        self
    }

    /// Sets the inclusion filters.
    #[must_use]
    pub fn with_filters(mut self, filters: Vec<String>) -> Self {
        self.filters = filters;
        self
    }

    /// Sets the compression level.
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = Some(level);
        self
    }

    /// Prepares the configured filters.
    #[must_use]
    pub fn filter_spec(&self) -> FilterSpec {
        FilterSpec::new(&self.filters)
    }

    /// Resolves container and compression for `archive`.
    ///
    /// Explicit settings win; unset ones come from the file extension, and
    /// an unknown extension means an uncompressed tar.
    ///
    /// # Examples
    ///
    /// ```
    /// use filearc_core::CompressOptions;
    /// use filearc_core::CompressionKind;
    /// use filearc_core::ContainerFormat;
    /// use std::path::Path;
    ///
    /// let options = CompressOptions::default();
    /// assert_eq!(
    ///     options.resolve_format(Path::new("out.tgz")),
    ///     (ContainerFormat::Tar, CompressionKind::Gzip)
    /// );
    ///
    /// let options = CompressOptions::default().with_compression(CompressionKind::Uncompressed);
    /// assert_eq!(
    ///     options.resolve_format(Path::new("out.tgz")),
    ///     (ContainerFormat::Tar, CompressionKind::Uncompressed)
    /// );
    /// ```
    #[must_use]
    pub fn resolve_format(&self, archive: &Path) -> (ContainerFormat, CompressionKind) {
        let (detected_format, detected_compression) = detect_format(archive).unwrap_or_default();
        (
            self.format.unwrap_or(detected_format),
            self.compression.unwrap_or(detected_compression),
        )
    }
}

/// Options for extraction.
///
/// # Examples
///
/// ```
/// use filearc_core::ExtractOptions;
///
/// let options = ExtractOptions::default()
///     .with_flat_dir(true)
///     .with_no_override(true)
///     .with_match_prefix("input/c");
///
/// assert!(options.flat_dir);
/// assert_eq!(options.match_prefix.as_deref(), Some("input/c"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Write files and symlinks directly under the target directory by base
    /// name, skipping directory entries.
    ///
    /// Default: `false`.
    pub flat_dir: bool,

    /// Inclusion filters, in platform path syntax. Empty extracts everything.
    ///
    /// Default: empty.
    pub filters: Vec<String>,

    /// Leave existing non-directory files untouched.
    ///
    /// Default: `false`.
    pub no_override: bool,

    /// Only extract entries under this archive path, stripping it from the
    /// written paths. `None` or empty extracts everything.
    ///
    /// Default: `None`.
    pub match_prefix: Option<String>,
}

impl ExtractOptions {
    /// Creates options with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets flat extraction.
    #[must_use]
    pub fn with_flat_dir(mut self, flat: bool) -> Self {
        self.flat_dir = flat;
        self
    }

    /// Sets the inclusion filters.
    #[must_use]
    pub fn with_filters(mut self, filters: Vec<String>) -> Self {
        self.filters = filters;
        self
    }

    /// Sets the no-override policy.
    #[must_use]
    pub fn with_no_override(mut self, no_override: bool) -> Self {
        self.no_override = no_override;
        self
    }

    /// Sets the match prefix.
    #[must_use]
    pub fn with_match_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.match_prefix = Some(prefix.into());
        self
    }

    /// Prepares the configured filters.
    #[must_use]
    pub fn filter_spec(&self) -> FilterSpec {
        FilterSpec::new(&self.filters)
    }
}
