//! M3U playlist retrieval
//!
//! Bodies are sniffed for gzip and decoded before being handed to the
//! parser. Invalid UTF-8 is replaced rather than rejected, since upstream
//! playlists are frequently hand-edited.

use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use tracing::{debug, info};
use url::Url;

use super::PlaylistSource;
use crate::config::SourceSettings;
use crate::errors::{AppResult, SourceError, SourceResult};
use crate::utils::{CompressionFormat, DecompressionService, UrlUtils};

/// Fetches a playlist with a single GET request
pub struct HttpPlaylistSource {
    client: Client,
    url: Url,
}

impl HttpPlaylistSource {
    pub fn new(url: Url, settings: &SourceSettings) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.as_str())
            .build()?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl PlaylistSource for HttpPlaylistSource {
    fn describe(&self) -> String {
        UrlUtils::obfuscate_credentials(self.url.as_str())
    }

    async fn fetch(&self) -> SourceResult<String> {
        let safe_url = self.describe();
        info!("Fetching playlist from: {}", safe_url);

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| SourceError::connection(&safe_url, e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::http(
                status.as_u16(),
                format!(
                    "{} - URL: {}",
                    status.canonical_reason().unwrap_or("Unknown"),
                    safe_url
                ),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::connection(&safe_url, format!("Failed to read response: {}", e.without_url())))?;

        debug!("Fetched {} bytes of raw content", bytes.len());
        decode_body(&bytes)
    }
}

/// Reads a playlist from the local filesystem
pub struct FilePlaylistSource {
    path: PathBuf,
}

impl FilePlaylistSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PlaylistSource for FilePlaylistSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> SourceResult<String> {
        info!("Reading playlist from: {}", self.path.display());

        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| SourceError::File {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        debug!("Read {} bytes of raw content", bytes.len());
        decode_body(&bytes)
    }
}

/// Decompress if needed and decode as UTF-8, replacing invalid sequences
fn decode_body(bytes: &[u8]) -> SourceResult<String> {
    let format = DecompressionService::detect_compression_format(bytes);
    debug!("Detected compression format: {:?}", format);

    let text = match format {
        CompressionFormat::Uncompressed => String::from_utf8_lossy(bytes).into_owned(),
        _ => {
            let decompressed = DecompressionService::decompress(bytes)
                .map_err(|e| SourceError::decompression(format!("{e:#}")))?;
            debug!(
                "Decompressed {} bytes to {} bytes",
                bytes.len(),
                decompressed.len()
            );
            String::from_utf8_lossy(&decompressed).into_owned()
        }
    };

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_decode_plain_body() {
        let text = decode_body(b"#EXTM3U\n#EXTINF:-1,A\nhttp://a\n").unwrap();
        assert!(text.starts_with("#EXTM3U"));
    }

    #[test]
    fn test_decode_gzip_body() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"#EXTM3U\n#EXTINF:-1,A\nhttp://a\n").unwrap();
        let compressed = encoder.finish().unwrap();

        let text = decode_body(&compressed).unwrap();
        assert_eq!(text, "#EXTM3U\n#EXTINF:-1,A\nhttp://a\n");
    }

    #[test]
    fn test_decode_replaces_invalid_utf8() {
        let text = decode_body(b"#EXTINF:-1,Caf\xe9\nhttp://a\n").unwrap();
        assert!(text.contains("Caf\u{FFFD}"));
    }

    #[tokio::test]
    async fn test_file_source_reads_playlist() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("input.m3u");
        std::fs::write(&path, "#EXTM3U\n").unwrap();

        let source = FilePlaylistSource::new(&path);
        assert_eq!(source.fetch().await.unwrap(), "#EXTM3U\n");
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = FilePlaylistSource::new(dir.path().join("missing.m3u"));

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::File { .. }));
    }

    #[test]
    fn test_http_source_describe_hides_credentials() {
        let url = Url::parse("http://example.com/get.php?username=u&password=p").unwrap();
        let source = HttpPlaylistSource::new(url, &crate::config::SourceSettings {
            url: None,
            timeout: std::time::Duration::from_secs(5),
            user_agent: "test".to_string(),
        })
        .unwrap();

        assert_eq!(
            source.describe(),
            "http://example.com/get.php?username=****&password=****"
        );
    }
}
