//! File system quarantine router.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::fs;
use tracing::{debug, info};

use super::config::QuarantineConfig;
use super::error::QuarantineError;
use super::types::{QuarantineBucket, QuarantineRecord};

/// Moves files into `<root>/<bucket>/`.
///
/// Collision resolution and the move itself are serialized per bucket
/// directory, so concurrent callers never claim the same suffix.
pub struct QuarantineRouter {
    root: PathBuf,
    bucket_locks: Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>,
}

impl QuarantineRouter {
    /// Creates a router for `config.root`, resolved to an absolute path.
    pub fn new(config: &QuarantineConfig) -> Result<Self, QuarantineError> {
        let root = normalize_lexically(&std::path::absolute(&config.root)?);
        Ok(Self {
            root,
            bucket_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Absolute quarantine root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Moves `path` into the bucket for a failure class.
    pub async fn quarantine(
        &self,
        path: &Path,
        bucket: QuarantineBucket,
    ) -> Result<QuarantineRecord, QuarantineError> {
        self.quarantine_into(path, bucket.dir_name()).await
    }

    /// Moves `path` into `<root>/<bucket_name>/`.
    ///
    /// The destination is validated before any directory is created. On
    /// error the source file is left where it was.
    pub async fn quarantine_into(
        &self,
        path: &Path,
        bucket_name: &str,
    ) -> Result<QuarantineRecord, QuarantineError> {
        ensure_source(path).await?;

        let bucket_dir = self.bucket_dir(bucket_name)?;
        let lock = self.bucket_lock(&bucket_dir);
        let _guard = lock.lock().await;

        let destination = self.resolve_destination(path, &bucket_dir).await?;

        fs::create_dir_all(&bucket_dir)
            .await
            .map_err(|e| QuarantineError::DirectoryCreationFailed {
                path: bucket_dir.clone(),
                source: e,
            })?;

        move_file(path, &destination).await?;

        info!(
            "Quarantined {} -> {}",
            path.display(),
            destination.display()
        );

        Ok(QuarantineRecord {
            original: path.to_path_buf(),
            destination,
            bucket: bucket_name.to_string(),
        })
    }

    /// Computes where `path` would go without moving anything.
    pub async fn plan(
        &self,
        path: &Path,
        bucket: QuarantineBucket,
    ) -> Result<QuarantineRecord, QuarantineError> {
        ensure_source(path).await?;
        let bucket_dir = self.bucket_dir(bucket.dir_name())?;
        let destination = self.resolve_destination(path, &bucket_dir).await?;
        Ok(QuarantineRecord {
            original: path.to_path_buf(),
            destination,
            bucket: bucket.dir_name().to_string(),
        })
    }

    fn bucket_dir(&self, bucket_name: &str) -> Result<PathBuf, QuarantineError> {
        self.contained(self.root.join(bucket_name))
    }

    /// First free `<stem>[_N]<.ext>` in `bucket_dir`, validated after every
    /// rename attempt.
    async fn resolve_destination(
        &self,
        path: &Path,
        bucket_dir: &Path,
    ) -> Result<PathBuf, QuarantineError> {
        let invalid = || QuarantineError::InvalidFileName {
            path: path.to_path_buf(),
        };
        let file_name = path.file_name().ok_or_else(invalid)?;
        let stem = path.file_stem().unwrap_or(file_name);
        let extension = path.extension();

        let mut counter: u32 = 0;
        loop {
            let name = suffixed_name(stem, extension, counter);
            let candidate = self.contained(bucket_dir.join(name))?;
            if candidate.as_path() == bucket_dir {
                return Err(invalid());
            }
            if !fs::try_exists(&candidate).await? {
                return Ok(candidate);
            }
            debug!("{} exists, trying next suffix", candidate.display());
            counter = counter.checked_add(1).ok_or_else(invalid)?;
        }
    }

    /// Normalizes `path` and checks it stays strictly below the root.
    fn contained(&self, path: PathBuf) -> Result<PathBuf, QuarantineError> {
        let normalized = normalize_lexically(&path);
        if normalized.starts_with(&self.root) && normalized != self.root {
            Ok(normalized)
        } else {
            Err(QuarantineError::PathEscapesRoot {
                path,
                root: self.root.clone(),
            })
        }
    }

    fn bucket_lock(&self, bucket_dir: &Path) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .bucket_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(bucket_dir.to_path_buf())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

async fn ensure_source(path: &Path) -> Result<(), QuarantineError> {
    if fs::try_exists(path).await? {
        Ok(())
    } else {
        Err(QuarantineError::SourceNotFound {
            path: path.to_path_buf(),
        })
    }
}

fn suffixed_name(stem: &OsStr, extension: Option<&OsStr>, counter: u32) -> OsString {
    let mut name = stem.to_os_string();
    if counter > 0 {
        name.push(format!("_{}", counter));
    }
    if let Some(extension) = extension {
        name.push(".");
        name.push(extension);
    }
    name
}

/// Resolves `.` and `..` without touching the file system.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Renames, falling back to copy and remove across file systems.
async fn move_file(from: &Path, to: &Path) -> Result<(), QuarantineError> {
    let failed = |e| QuarantineError::move_failed(from.to_path_buf(), to.to_path_buf(), e);

    match fs::rename(from, to).await {
        Ok(()) => Ok(()),
        // EXDEV is 18 on Linux
        Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices || e.raw_os_error() == Some(18) => {
            debug!("Cross-device move, copying {}", from.display());
            if let Err(e) = fs::copy(from, to).await {
                let _ = fs::remove_file(to).await;
                return Err(failed(e));
            }
            if let Err(e) = fs::remove_file(from).await {
                let _ = fs::remove_file(to).await;
                return Err(failed(e));
            }
            Ok(())
        }
        Err(e) => Err(failed(e)),
    }
}
