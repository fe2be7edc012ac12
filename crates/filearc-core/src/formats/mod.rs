//! Archive format implementations.

pub mod compression;
pub mod detect;
pub mod tar;
pub mod zip;

// Re-export main types for convenience
pub use compression::Decoder;
pub use compression::Encoder;
pub use detect::CompressionKind;
pub use detect::ContainerFormat;
