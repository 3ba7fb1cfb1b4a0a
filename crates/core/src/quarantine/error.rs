//! Error types for the quarantine module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while quarantining a file. When one is returned
/// the file has not been moved.
#[derive(Debug, Error)]
pub enum QuarantineError {
    /// The file to quarantine does not exist.
    #[error("Source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// The computed destination would land outside the quarantine root.
    #[error("Destination {path} escapes quarantine root {root}")]
    PathEscapesRoot { path: PathBuf, root: PathBuf },

    /// The source path has no usable file name.
    #[error("Invalid file name: {path}")]
    InvalidFileName { path: PathBuf },

    /// Failed to create the bucket directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to move the file.
    #[error("Failed to move file from {from} to {to}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Other I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuarantineError {
    pub fn move_failed(from: PathBuf, to: PathBuf, error: std::io::Error) -> Self {
        Self::MoveFailed { from, to, error }
    }

    /// Whether the request itself was rejected, as opposed to the
    /// filesystem failing.
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            Self::PathEscapesRoot { .. } | Self::InvalidFileName { .. }
        )
    }
}
