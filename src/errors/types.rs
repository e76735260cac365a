//! Error type definitions for m3u-curator
//!
//! Only fatal conditions live here. Lines that do not form an entry and
//! channels missing from the allow-list are ordinary outcomes and are
//! modelled as values (see `ingestor::m3u_parser` and `proxy::filter_engine`).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Required settings absent or malformed
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Fetching the upstream playlist failed
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// The output playlist could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Source fetching specific errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Upstream answered with a non-success status
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Transport failure before a response was received
    #[error("Connection failed: {url} - {message}")]
    Connection { url: String, message: String },

    /// Local playlist file could not be read
    #[error("Failed to read {}: {message}", path.display())]
    File { path: PathBuf, message: String },

    /// Body looked compressed but could not be decoded
    #[error("Decompression failed: {message}")]
    Decompression { message: String },
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a write error for the given target
    pub fn write<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Whether the error was raised before any network or file activity
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

impl SourceError {
    /// Create an HTTP status error
    pub fn http<M: Into<String>>(status: u16, message: M) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Create a connection error
    pub fn connection<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Connection {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a decompression error
    pub fn decompression<M: Into<String>>(message: M) -> Self {
        Self::Decompression {
            message: message.into(),
        }
    }
}
