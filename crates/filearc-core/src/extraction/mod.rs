//! Archive extraction.
//!
//! The engine turns decoded entries into files, directories and symlinks
//! under a target directory, applying filters, prefix selection, flattening
//! and the overwrite policy. Nothing is ever written outside the target.

pub mod engine;
pub mod materialize;

pub use engine::extract_entries;
