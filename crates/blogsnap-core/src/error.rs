//! Error types for the archive pipeline.
//!
//! Per-URL failures (`FetchError`) are caught at the fetcher boundary and
//! turned into a boolean plus a log line. Only `ArchiveError` (setup
//! problems) is fatal to a run.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal setup errors: the run cannot proceed.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// An expected input (asset list file, HTML corpus directory) is absent.
    #[error("{what} not found: {}", path.display())]
    MissingInput { what: &'static str, path: PathBuf },
}

/// Error from fetching a single URL. Never aborts a batch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Server answered with something other than 200.
    #[error("{url}: HTTP {code}")]
    HttpStatus { url: String, code: u32 },
    /// Connection, DNS, TLS or timeout failure reported by libcurl.
    #[error("{url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: curl::Error,
    },
    /// Local filesystem failure while creating directories or writing the body.
    #[error("storage {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The normalized URL has no host, so no local path can be derived.
    #[error("{url}: not a fetchable URL")]
    InvalidUrl { url: String },
}

impl FetchError {
    /// Short label used in summaries ("HTTPStatusError", "TransportError", ...).
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::HttpStatus { .. } => "HTTPStatusError",
            FetchError::Transport { .. } => "TransportError",
            FetchError::Storage { .. } => "StorageError",
            FetchError::InvalidUrl { .. } => "InvalidUrl",
        }
    }
}
