//! Mock metadata reader for testing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::metadata::{AudioTags, MetadataError, MetadataReader};

/// Mock implementation of the MetadataReader trait.
///
/// Tags are configured per path. Paths without configured tags get the
/// default tags if set, otherwise an unreadable error. Every read is
/// recorded.
///
/// The trait is synchronous, so this mock uses `std::sync::RwLock`.
#[derive(Debug, Default)]
pub struct MockMetadataReader {
    /// Configured results by path; `Err` holds the failure reason.
    results: Arc<RwLock<HashMap<PathBuf, Result<AudioTags, String>>>>,
    /// Tags for paths without a configured result.
    default_tags: Arc<RwLock<Option<AudioTags>>>,
    /// Paths read, in order.
    reads: Arc<RwLock<Vec<PathBuf>>>,
}

impl MockMetadataReader {
    /// Create a new mock reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tags returned for a path.
    pub fn set_tags(&self, path: impl AsRef<Path>, tags: AudioTags) {
        write_lock(&self.results).insert(path.as_ref().to_path_buf(), Ok(tags));
    }

    /// Make reading a path fail.
    pub fn set_error(&self, path: impl AsRef<Path>, reason: impl Into<String>) {
        write_lock(&self.results).insert(path.as_ref().to_path_buf(), Err(reason.into()));
    }

    /// Set the tags returned for unconfigured paths.
    pub fn set_default_tags(&self, tags: AudioTags) {
        *write_lock(&self.default_tags) = Some(tags);
    }

    /// Get all recorded reads.
    pub fn recorded_reads(&self) -> Vec<PathBuf> {
        read_lock(&self.reads).clone()
    }

    /// Get the number of reads performed.
    pub fn read_count(&self) -> usize {
        read_lock(&self.reads).len()
    }
}

fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

impl MetadataReader for MockMetadataReader {
    fn name(&self) -> &str {
        "mock"
    }

    fn read(&self, path: &Path) -> Result<AudioTags, MetadataError> {
        write_lock(&self.reads).push(path.to_path_buf());

        match read_lock(&self.results).get(path) {
            Some(Ok(tags)) => return Ok(tags.clone()),
            Some(Err(reason)) => return Err(MetadataError::unreadable(path, reason.clone())),
            None => {}
        }

        read_lock(&self.default_tags)
            .clone()
            .ok_or_else(|| MetadataError::unreadable(path, "no tags configured"))
    }
}
