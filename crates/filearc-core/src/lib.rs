//! Filtered tar/zip archive codec.
//!
//! `filearc-core` builds and reads tar and zip archives, optionally wrapped
//! in gzip (read and write) or bzip2 (read only). Creation walks a directory
//! tree under an inclusion filter; extraction recreates files, directories
//! and symlinks under a target directory with no-override and flattening
//! policies, and never writes outside that directory.
//!
//! # Examples
//!
//! ```no_run
//! use filearc_core::CompressOptions;
//! use filearc_core::ExtractOptions;
//! use filearc_core::compress_archive;
//! use filearc_core::extract_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = CompressOptions::default().with_filters(vec!["src".into()]);
//! compress_archive("project.tar.gz", "project", &options)?;
//!
//! let report = extract_archive("project.tar.gz", "/tmp/restore", &ExtractOptions::default())?;
//! println!("Extracted {} files", report.files_extracted);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod copy;
pub mod creation;
pub mod error;
pub mod extraction;
pub mod filter;
pub mod formats;
pub mod report;
pub mod session;
pub mod types;

#[doc(hidden)]
pub mod test_utils;

// Re-export main API types
pub use api::compress_archive;
pub use api::extract_archive;
pub use api::list_archive;
pub use api::read_entry;
pub use config::CompressOptions;
pub use config::ExtractOptions;
pub use error::ArchiveError;
pub use error::Result;
pub use filter::FilterSpec;
pub use formats::CompressionKind;
pub use formats::ContainerFormat;
pub use report::CreationReport;
pub use report::ExtractionReport;
pub use session::ArchiveReader;
pub use session::ArchiveWriter;
pub use session::Entries;
pub use session::EntryStream;
pub use types::ArchiveEntry;
pub use types::EntryType;
