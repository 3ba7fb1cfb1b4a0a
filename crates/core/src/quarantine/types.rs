//! Types for the quarantine module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Holding directory for a class of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarantineBucket {
    Drm,
    NoMetadata,
    Truncated,
    Corrupted,
}

impl QuarantineBucket {
    pub const ALL: [QuarantineBucket; 4] = [
        Self::Drm,
        Self::NoMetadata,
        Self::Truncated,
        Self::Corrupted,
    ];

    /// Directory name under the quarantine root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Drm => "drm",
            Self::NoMetadata => "no_metadata",
            Self::Truncated => "truncated",
            Self::Corrupted => "corrupted",
        }
    }
}

impl fmt::Display for QuarantineBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// A completed (or, in dry runs, planned) quarantine move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarantineRecord {
    pub original: PathBuf,
    pub destination: PathBuf,
    /// Bucket directory name.
    pub bucket: String,
}
