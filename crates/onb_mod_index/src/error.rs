//! Error types for indexing runs.
//!
//! All fallible functions in this crate return [`Result<T>`], which uses [`Error`]
//! as the error type. External error types (`std::io::Error`, `serde_json::Error`,
//! `reqwest::Error`) are converted via `From` impls.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while indexing the mod catalog.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem I/O failed (temp archives, cache file, output files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse or serialize JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTTP client failed to send a request or read a response body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog endpoint answered with a non-success status.
    #[error("Catalog request to {url} failed with status {status}")]
    CatalogStatus { url: String, status: u16 },

    /// The catalog body parsed as JSON but is not an object.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// The archive endpoint answered with a non-success status.
    #[error("Download of {url} failed with status {status}")]
    DownloadRejected { url: String, status: u16 },

    /// The persisted cache file exists but cannot be read.
    #[error("Cannot read cache file {path}: {source}")]
    CacheRead {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The persisted cache file exists but cannot be parsed.
    #[error("Invalid cache file {path}: {source}")]
    InvalidCacheFile {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
