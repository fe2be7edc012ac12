//! Archive creation support.
//!
//! Walks filesystem sources into archive entries. Writing the entries is the
//! job of [`ArchiveWriter`](crate::ArchiveWriter).

pub mod walker;

pub use walker::FilteredEntry;
pub use walker::FilteredWalker;
