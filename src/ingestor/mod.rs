pub mod m3u_parser;

pub use m3u_parser::{parse_entries, M3uEntries, URL_PREFIX};
