//! Error types for the metadata module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading embedded tags.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The file does not exist.
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    /// The container could not be parsed.
    #[error("Cannot read audio metadata from {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MetadataError {
    /// Creates an unreadable-container error.
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Unreadable {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
