//! Archive sessions.
//!
//! A session owns one archive file and the compression and container layers
//! stacked on it. Reading and writing are separate types, so a session is
//! never both.

pub mod append;
pub mod reader;
pub mod writer;

pub use reader::ArchiveReader;
pub use reader::Entries;
pub use reader::EntryStream;
pub use writer::ArchiveWriter;
