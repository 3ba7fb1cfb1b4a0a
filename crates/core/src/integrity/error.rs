//! Error types for the integrity module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the external duration probe and decoder.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// FFprobe binary not found.
    #[error("FFprobe not found at path: {path}")]
    FfprobeNotFound { path: PathBuf },

    /// The tool did not finish in time.
    #[error("Timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The tool exited unsuccessfully.
    #[error("Probe failed: {reason}")]
    ProbeFailed { reason: String },

    /// The tool's output could not be parsed.
    #[error("Failed to parse tool output: {reason}")]
    ParseError { reason: String },

    /// I/O error while running the tool.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    pub fn probe_failed(reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            reason: reason.into(),
        }
    }

    pub fn parse_error(reason: impl Into<String>) -> Self {
        Self::ParseError {
            reason: reason.into(),
        }
    }

    /// Whether the tool itself is missing.
    pub fn is_tool_missing(&self) -> bool {
        matches!(
            self,
            Self::FfmpegNotFound { .. } | Self::FfprobeNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let missing = ProbeError::FfprobeNotFound {
            path: PathBuf::from("ffprobe"),
        };
        assert!(missing.is_tool_missing());

        let timeout = ProbeError::Timeout { timeout_secs: 5 };
        assert!(!timeout.is_tool_missing());
        assert_eq!(timeout.to_string(), "Timed out after 5 seconds");
    }
}
