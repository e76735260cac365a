//! Playlist sources
//!
//! A source produces the raw playlist text for one run. The HTTP source is
//! the normal case; the file source reads a playlist saved on disk.

use async_trait::async_trait;

use crate::errors::SourceResult;

pub mod m3u;

pub use m3u::{FilePlaylistSource, HttpPlaylistSource};

#[async_trait]
pub trait PlaylistSource: Send + Sync {
    /// Log-safe description of where the playlist comes from
    fn describe(&self) -> String;

    /// Fetch the full playlist text
    async fn fetch(&self) -> SourceResult<String>;
}
