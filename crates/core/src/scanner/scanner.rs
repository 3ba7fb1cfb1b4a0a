//! Concurrent directory scanner.

use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::index::is_audio_file;
use crate::integrity::{IntegrityChecker, IntegrityVerdict};
use crate::quarantine::QuarantineRouter;

use super::checkpoint::Checkpoint;
use super::config::ScannerConfig;
use super::error::ScanError;
use super::types::{ScanOptions, ScanReport, ScanStats};

/// Runs the integrity pipeline over every audio file below a directory.
pub struct DirectoryScanner {
    config: ScannerConfig,
    checker: Arc<IntegrityChecker>,
    router: Option<Arc<QuarantineRouter>>,
}

impl DirectoryScanner {
    pub fn new(config: ScannerConfig, checker: Arc<IntegrityChecker>) -> Self {
        Self {
            config,
            checker,
            router: None,
        }
    }

    /// Enables quarantining through `router`.
    pub fn with_quarantine(mut self, router: Arc<QuarantineRouter>) -> Self {
        self.router = Some(router);
        self
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Audio files below `dir` in file-name order, skipping `exclude` and
    /// stopping after `limit` files.
    pub fn collect_audio_files(
        dir: &Path,
        limit: Option<usize>,
        exclude: &BTreeSet<PathBuf>,
    ) -> Vec<PathBuf> {
        WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && is_audio_file(entry.path()))
            .map(|entry| entry.into_path())
            .filter(|path| !exclude.contains(path))
            .take(limit.unwrap_or(usize::MAX))
            .collect()
    }

    /// Scans `dir`. Individual file problems are counted in the report;
    /// only setup problems return an error.
    pub async fn scan(&self, dir: &Path, options: &ScanOptions) -> Result<ScanReport, ScanError> {
        let dir = dir
            .canonicalize()
            .ok()
            .filter(|d| d.is_dir())
            .ok_or_else(|| ScanError::DirectoryNotFound {
                path: dir.to_path_buf(),
            })?;

        let router = match (&self.router, options.quarantine) {
            (Some(router), true) => Some(Arc::clone(router)),
            (None, true) => return Err(ScanError::QuarantineNotConfigured),
            (_, false) => None,
        };

        let checkpoint_path = self.config.checkpoint_path.clone();
        let checkpointing = options.resume || self.config.checkpoint_interval > 0;
        let mut checkpoint = if options.resume {
            self.load_checkpoint(&checkpoint_path)
        } else {
            Checkpoint::new()
        };

        let walk_dir = dir.clone();
        let exclude = checkpoint.processed_files().clone();
        let limit = options.limit;
        let files = tokio::task::spawn_blocking(move || {
            Self::collect_audio_files(&walk_dir, limit, &exclude)
        })
        .await
        .map_err(|e| ScanError::TaskFailed {
            reason: e.to_string(),
        })?;

        let mut report = ScanReport {
            stats: checkpoint.stats,
            skipped: checkpoint.processed_count(),
            dry_run: options.dry_run,
            ..Default::default()
        };

        if files.is_empty() {
            info!("No audio files found to scan in {}", dir.display());
            return Ok(report);
        }
        info!("Found {} audio files to check in {}", files.len(), dir.display());

        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel_checks.max(1)));
        let mut tasks: FuturesUnordered<_> = files
            .into_iter()
            .map(|path| {
                let checker = Arc::clone(&self.checker);
                let semaphore = Arc::clone(&semaphore);
                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.ok();
                    checker.check(&path).await
                })
            })
            .collect();

        let mut done = 0usize;
        while let Some(joined) = tasks.next().await {
            match joined {
                Ok(verdict) => {
                    let path = verdict.path.clone();
                    self.record(verdict, router.as_deref(), options.dry_run, &mut report)
                        .await;
                    checkpoint.mark_processed(path);
                }
                Err(e) => {
                    error!("Integrity check task failed: {}", e);
                    report.stats.errors += 1;
                }
            }

            done += 1;
            if checkpointing
                && self.config.checkpoint_interval > 0
                && done % self.config.checkpoint_interval == 0
            {
                checkpoint.stats = report.stats;
                save_checkpoint(&mut checkpoint, &checkpoint_path);
            }
        }

        if checkpointing {
            if options.dry_run {
                checkpoint.stats = report.stats;
                save_checkpoint(&mut checkpoint, &checkpoint_path);
            } else if let Err(e) = Checkpoint::clear(&checkpoint_path) {
                warn!("{}", e);
            }
        }

        log_summary(&report.stats);
        Ok(report)
    }

    async fn record(
        &self,
        verdict: IntegrityVerdict,
        router: Option<&QuarantineRouter>,
        dry_run: bool,
        report: &mut ScanReport,
    ) {
        report.stats.total += 1;
        if verdict.ok {
            report.stats.good += 1;
            return;
        }

        report.stats.corrupted += 1;
        info!(
            "Corrupted: {} ({})",
            verdict.path.display(),
            verdict.detail.as_deref().unwrap_or("unknown")
        );

        if let Some(router) = router {
            match verdict.quarantine_bucket() {
                Some(bucket) if dry_run => match router.plan(&verdict.path, bucket).await {
                    Ok(record) => {
                        info!(
                            "Would quarantine {} -> {}",
                            verdict.path.display(),
                            record.destination.display()
                        );
                        report.quarantined.push(record);
                    }
                    Err(e) => {
                        warn!("Cannot quarantine {}: {}", verdict.path.display(), e);
                        report.stats.quarantine_errors += 1;
                    }
                },
                Some(bucket) => match router.quarantine(&verdict.path, bucket).await {
                    Ok(record) => {
                        report.stats.quarantined += 1;
                        report.quarantined.push(record);
                    }
                    Err(e) => {
                        error!("Failed to quarantine {}: {}", verdict.path.display(), e);
                        report.stats.quarantine_errors += 1;
                    }
                },
                None => debug!("Nothing to quarantine for {}", verdict.path.display()),
            }
        }

        report.failures.push(verdict);
    }

    fn load_checkpoint(&self, path: &Path) -> Checkpoint {
        match Checkpoint::load(path) {
            Ok(Some(checkpoint)) => {
                info!(
                    "Resuming scan - {} files already processed",
                    checkpoint.processed_count()
                );
                checkpoint
            }
            Ok(None) => Checkpoint::new(),
            Err(e) => {
                warn!("Ignoring unreadable checkpoint: {}", e);
                Checkpoint::new()
            }
        }
    }
}

fn save_checkpoint(checkpoint: &mut Checkpoint, path: &Path) {
    if let Err(e) = checkpoint.save(path) {
        error!("Failed to save checkpoint: {}", e);
    }
}

fn log_summary(stats: &ScanStats) {
    info!(
        "Scan complete: {} checked, {} good, {} corrupted, {} quarantined, {} quarantine errors, {} errors",
        stats.total,
        stats.good,
        stats.corrupted,
        stats.quarantined,
        stats.quarantine_errors,
        stats.errors
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrity::{DecodeOutcome, IntegrityConfig};
    use crate::quarantine::QuarantineConfig;
    use crate::testing::{fixtures, MockDecoder, MockDurationProbe, MockMetadataReader};
    use std::fs;
    use tempfile::TempDir;

    struct Library {
        dir: TempDir,
        decoder: Arc<MockDecoder>,
        checker: Arc<IntegrityChecker>,
    }

    impl Library {
        fn root(&self) -> PathBuf {
            self.dir.path().join("music")
        }

        fn checkpoint_path(&self) -> PathBuf {
            self.dir.path().join("checkpoint.json")
        }

        fn config(&self) -> ScannerConfig {
            ScannerConfig::default().with_checkpoint_path(self.checkpoint_path())
        }

        fn router(&self) -> Arc<QuarantineRouter> {
            let config = QuarantineConfig::default().with_root(self.dir.path().join("quarantine"));
            Arc::new(QuarantineRouter::new(&config).unwrap())
        }

        async fn mark_corrupt(&self, relative: &str) {
            let path = fs::canonicalize(self.root().join(relative)).unwrap();
            self.decoder
                .set_outcome(path, DecodeOutcome::new(234, ""))
                .await;
        }
    }

    fn library(files: &[&str]) -> Library {
        let dir = TempDir::new().unwrap();
        for file in files {
            let path = dir.path().join("music").join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, b"audio").unwrap();
        }

        let reader = Arc::new(MockMetadataReader::new());
        reader.set_default_tags(fixtures::audio_tags("Song", "Artist", 200.0));
        let decoder = Arc::new(MockDecoder::new());
        let checker = Arc::new(IntegrityChecker::new(
            IntegrityConfig::default(),
            reader,
            Arc::new(MockDurationProbe::new()),
            decoder.clone(),
        ));

        Library {
            dir,
            decoder,
            checker,
        }
    }

    #[test]
    fn test_collect_audio_files() {
        let lib = library(&["b/two.mp3", "a/one.flac", "cover.jpg", "a/notes.txt"]);
        let files =
            DirectoryScanner::collect_audio_files(&lib.root(), None, &BTreeSet::new());
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a/one.flac"));
        assert!(files[1].ends_with("b/two.mp3"));

        let limited = DirectoryScanner::collect_audio_files(&lib.root(), Some(1), &BTreeSet::new());
        assert_eq!(limited.len(), 1);

        let exclude: BTreeSet<PathBuf> = [files[0].clone()].into_iter().collect();
        let rest = DirectoryScanner::collect_audio_files(&lib.root(), None, &exclude);
        assert_eq!(rest, vec![files[1].clone()]);
    }

    #[tokio::test]
    async fn test_scan_counts_and_quarantines() {
        let lib = library(&["good.mp3", "bad.mp3", "also_good.flac"]);
        lib.mark_corrupt("bad.mp3").await;

        let router = lib.router();
        let scanner = DirectoryScanner::new(lib.config(), lib.checker.clone())
            .with_quarantine(router.clone());
        let report = scanner
            .scan(&lib.root(), &ScanOptions::default().with_quarantine(true))
            .await
            .unwrap();

        assert_eq!(report.stats.total, 3);
        assert_eq!(report.stats.good, 2);
        assert_eq!(report.stats.corrupted, 1);
        assert_eq!(report.stats.quarantined, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].path.ends_with("bad.mp3"));

        assert!(!lib.root().join("bad.mp3").exists());
        assert!(router.root().join("corrupted/bad.mp3").exists());
        assert!(!lib.checkpoint_path().exists());
    }

    #[tokio::test]
    async fn test_dry_run_moves_nothing() {
        let lib = library(&["bad.mp3"]);
        lib.mark_corrupt("bad.mp3").await;

        let scanner = DirectoryScanner::new(lib.config(), lib.checker.clone())
            .with_quarantine(lib.router());
        let report = scanner
            .scan(
                &lib.root(),
                &ScanOptions::default().with_quarantine(true).with_dry_run(true),
            )
            .await
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.stats.quarantined, 0);
        assert_eq!(report.quarantined.len(), 1);
        assert!(report.quarantined[0].destination.ends_with("corrupted/bad.mp3"));
        assert!(lib.root().join("bad.mp3").exists());
        assert!(lib.checkpoint_path().exists());
    }

    #[tokio::test]
    async fn test_resume_skips_processed_files() {
        let lib = library(&["a.mp3", "b.mp3", "c.mp3"]);
        let mut checkpoint = Checkpoint::new();
        checkpoint.mark_processed(fs::canonicalize(lib.root().join("a.mp3")).unwrap());
        checkpoint.stats.total = 1;
        checkpoint.stats.good = 1;
        checkpoint.save(&lib.checkpoint_path()).unwrap();

        let scanner = DirectoryScanner::new(lib.config(), lib.checker.clone());
        let report = scanner
            .scan(&lib.root(), &ScanOptions::default().with_resume(true))
            .await
            .unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.stats.total, 3);
        assert_eq!(report.stats.good, 3);
        assert_eq!(lib.decoder.decode_count().await, 2);
    }

    #[tokio::test]
    async fn test_unreadable_checkpoint_is_ignored() {
        let lib = library(&["a.mp3"]);
        fs::write(lib.checkpoint_path(), "garbage").unwrap();

        let scanner = DirectoryScanner::new(lib.config(), lib.checker.clone());
        let report = scanner
            .scan(&lib.root(), &ScanOptions::default().with_resume(true))
            .await
            .unwrap();
        assert_eq!(report.skipped, 0);
        assert_eq!(report.stats.total, 1);
    }

    #[tokio::test]
    async fn test_limit() {
        let lib = library(&["a.mp3", "b.mp3", "c.mp3"]);
        let scanner = DirectoryScanner::new(lib.config(), lib.checker.clone());
        let report = scanner
            .scan(&lib.root(), &ScanOptions::default().with_limit(2))
            .await
            .unwrap();
        assert_eq!(report.stats.total, 2);
    }

    #[tokio::test]
    async fn test_setup_errors() {
        let lib = library(&["a.mp3"]);
        let scanner = DirectoryScanner::new(lib.config(), lib.checker.clone());

        let err = scanner
            .scan(&lib.dir.path().join("missing"), &ScanOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::DirectoryNotFound { .. }));

        let err = scanner
            .scan(&lib.root(), &ScanOptions::default().with_quarantine(true))
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::QuarantineNotConfigured));
    }
}
