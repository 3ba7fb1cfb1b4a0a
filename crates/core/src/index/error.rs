//! Error types for the index module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building or caching the index.
///
/// Unreadable files and directories are not errors: they are logged and
/// skipped so one bad subtree never aborts a build.
#[derive(Debug, Error)]
pub enum IndexError {
    /// No root directory was supplied.
    #[error("No root directories to index")]
    NoRoots,

    /// Failed to read a cache file.
    #[error("Failed to read index cache {path}")]
    CacheRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a cache file.
    #[error("Failed to write index cache {path}")]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cache file exists but does not parse.
    #[error("Corrupt index cache {path}")]
    CacheFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
