//! Configuration for the scanner module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for batch directory scans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Maximum files checked concurrently.
    #[serde(default = "default_max_parallel")]
    pub max_parallel_checks: usize,

    /// Save the checkpoint every this many files. 0 disables periodic
    /// saves unless the scan is resumed.
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: usize,

    /// Where the checkpoint file is written.
    #[serde(default = "default_checkpoint_path")]
    pub checkpoint_path: PathBuf,
}

fn default_max_parallel() -> usize {
    4
}

fn default_checkpoint_interval() -> usize {
    100
}

fn default_checkpoint_path() -> PathBuf {
    PathBuf::from(".trackmend_scan_checkpoint.json")
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_parallel_checks: default_max_parallel(),
            checkpoint_interval: default_checkpoint_interval(),
            checkpoint_path: default_checkpoint_path(),
        }
    }
}

impl ScannerConfig {
    pub fn with_max_parallel_checks(mut self, max: usize) -> Self {
        self.max_parallel_checks = max;
        self
    }

    pub fn with_checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = interval;
        self
    }

    pub fn with_checkpoint_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint_path = path.into();
        self
    }
}
