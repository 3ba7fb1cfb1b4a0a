//! Types for the scanner module.

use serde::{Deserialize, Serialize};

use crate::integrity::IntegrityVerdict;
use crate::quarantine::QuarantineRecord;

/// Per-scan switches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Move failed files into quarantine.
    pub quarantine: bool,
    /// Report what would be quarantined without moving anything.
    pub dry_run: bool,
    /// Check at most this many files.
    pub limit: Option<usize>,
    /// Skip files recorded in an existing checkpoint.
    pub resume: bool,
}

impl ScanOptions {
    pub fn with_quarantine(mut self, quarantine: bool) -> Self {
        self.quarantine = quarantine;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }
}

/// Running counters, persisted in the checkpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanStats {
    pub total: u64,
    pub good: u64,
    pub corrupted: u64,
    pub quarantined: u64,
    pub quarantine_errors: u64,
    pub errors: u64,
}

/// Outcome of a scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub stats: ScanStats,
    /// Verdicts for every file that failed in this run.
    pub failures: Vec<IntegrityVerdict>,
    /// Files moved to quarantine, or that would have been in a dry run.
    pub quarantined: Vec<QuarantineRecord>,
    /// Files skipped because the checkpoint already had them.
    pub skipped: usize,
    pub dry_run: bool,
}
