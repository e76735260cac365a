//! Utility modules for m3u-curator
//!
//! - `utils::url` for log-safe URL rendering
//! - `utils::decompression` for compressed playlist bodies

pub mod decompression;
pub mod url;

pub use self::decompression::{CompressionFormat, DecompressionService};
pub use self::url::UrlUtils;
