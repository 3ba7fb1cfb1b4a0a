//! Types for the integrity module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::quarantine::QuarantineBucket;

/// How the decoder exited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeOutcome {
    /// Exit code; `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Decoder diagnostic output.
    pub stderr: String,
}

impl DecodeOutcome {
    pub fn new(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stderr: stderr.into(),
        }
    }

    pub fn clean() -> Self {
        Self::new(0, "")
    }
}

/// The individual checks, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityCheck {
    Existence,
    Metadata,
    Drm,
    Truncation,
    EndDecode,
}

impl fmt::Display for IntegrityCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Existence => "existence",
            Self::Metadata => "metadata",
            Self::Drm => "drm",
            Self::Truncation => "truncation",
            Self::EndDecode => "end_decode",
        };
        f.write_str(name)
    }
}

/// Why a file failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    MissingFile,
    NoMetadata,
    DrmProtected,
    Truncated,
    DecodeFailure,
}

impl FailureReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFile => "missing_file",
            Self::NoMetadata => "no_metadata",
            Self::DrmProtected => "drm_protected",
            Self::Truncated => "truncated",
            Self::DecodeFailure => "decode_failure",
        }
    }

    /// Quarantine bucket for this failure. A missing file has nothing to move.
    pub fn quarantine_bucket(&self) -> Option<QuarantineBucket> {
        match self {
            Self::MissingFile => None,
            Self::NoMetadata => Some(QuarantineBucket::NoMetadata),
            Self::DrmProtected => Some(QuarantineBucket::Drm),
            Self::Truncated => Some(QuarantineBucket::Truncated),
            Self::DecodeFailure => Some(QuarantineBucket::Corrupted),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Result of checking one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityVerdict {
    pub path: PathBuf,
    pub ok: bool,
    /// Checks that passed before the pipeline stopped.
    pub checks_passed: Vec<IntegrityCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureReason>,
    /// Human-readable explanation of the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_duration_secs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probed_duration_secs: Option<f64>,
    /// Seconds of audio missing from a truncated file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_seconds: Option<f64>,
}

impl IntegrityVerdict {
    pub(crate) fn pending(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ok: false,
            checks_passed: Vec::new(),
            failure: None,
            detail: None,
            tag_duration_secs: None,
            probed_duration_secs: None,
            missing_seconds: None,
        }
    }

    pub(crate) fn pass(&mut self, check: IntegrityCheck) {
        self.checks_passed.push(check);
    }

    pub(crate) fn fail(mut self, reason: FailureReason, detail: impl Into<String>) -> Self {
        self.ok = false;
        self.failure = Some(reason);
        self.detail = Some(detail.into());
        self
    }

    pub(crate) fn succeed(mut self) -> Self {
        self.ok = true;
        self
    }

    /// Suggested quarantine bucket, if the file failed and can be moved.
    pub fn quarantine_bucket(&self) -> Option<QuarantineBucket> {
        self.failure.and_then(|f| f.quarantine_bucket())
    }
}
