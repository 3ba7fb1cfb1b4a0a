//! Error types for the scanner module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a scan before or outside per-file processing.
///
/// Problems with individual files are counted in the report instead.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The directory to scan does not exist or is not a directory.
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Quarantine was requested but no quarantine router was configured.
    #[error("Quarantine requested but no quarantine root is configured")]
    QuarantineNotConfigured,

    /// Failed to read the checkpoint file.
    #[error("Failed to read checkpoint {path}")]
    CheckpointRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write or remove the checkpoint file.
    #[error("Failed to write checkpoint {path}")]
    CheckpointWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The checkpoint file is not valid JSON.
    #[error("Invalid checkpoint {path}")]
    CheckpointFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A background task could not be joined.
    #[error("Scan task failed: {reason}")]
    TaskFailed { reason: String },
}
