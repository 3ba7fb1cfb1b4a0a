//! Resumable scan progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::error::ScanError;
use super::types::ScanStats;

/// Files already checked plus the counters at the time of the last save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(default)]
    processed_files: BTreeSet<PathBuf>,
    #[serde(default)]
    pub stats: ScanStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_updated: Option<DateTime<Utc>>,
}

impl Checkpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a checkpoint. A missing file is `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>, ScanError> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = fs::read(path).map_err(|e| ScanError::CheckpointRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let checkpoint: Checkpoint =
            serde_json::from_slice(&raw).map_err(|e| ScanError::CheckpointFormat {
                path: path.to_path_buf(),
                source: e,
            })?;

        info!(
            "Loaded checkpoint from {} ({} files processed)",
            path.display(),
            checkpoint.processed_files.len()
        );
        Ok(Some(checkpoint))
    }

    /// Stamps `last_updated` and writes the checkpoint.
    pub fn save(&mut self, path: &Path) -> Result<(), ScanError> {
        self.last_updated = Some(Utc::now());

        let write_err = |e| ScanError::CheckpointWrite {
            path: path.to_path_buf(),
            source: e,
        };
        let json = serde_json::to_vec_pretty(self).map_err(|e| ScanError::CheckpointFormat {
            path: path.to_path_buf(),
            source: e,
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(write_err)?;
        fs::rename(&tmp, path).map_err(write_err)?;

        debug!("Saved checkpoint to {}", path.display());
        Ok(())
    }

    /// Deletes the checkpoint file if present.
    pub fn clear(path: &Path) -> Result<(), ScanError> {
        match fs::remove_file(path) {
            Ok(()) => {
                info!("Deleted checkpoint file: {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ScanError::CheckpointWrite {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    pub fn is_processed(&self, path: &Path) -> bool {
        self.processed_files.contains(path)
    }

    pub fn mark_processed(&mut self, path: impl Into<PathBuf>) {
        self.processed_files.insert(path.into());
    }

    pub fn processed_files(&self) -> &BTreeSet<PathBuf> {
        &self.processed_files
    }

    pub fn processed_count(&self) -> usize {
        self.processed_files.len()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }
}
