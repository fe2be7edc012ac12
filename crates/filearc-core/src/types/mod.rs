//! Entry metadata types shared by the codec, the sessions and the
//! extraction engine.

pub mod entry;
pub mod entry_type;

pub use entry::ArchiveEntry;
pub use entry::contained_path;
pub use entry::normalize_entry_name;
pub use entry_type::EntryType;
