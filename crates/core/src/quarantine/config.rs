//! Configuration for the quarantine module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the quarantine router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarantineConfig {
    /// Root directory holding the bucket directories.
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

fn default_root() -> PathBuf {
    PathBuf::from("quarantine")
}

impl Default for QuarantineConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

impl QuarantineConfig {
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }
}
