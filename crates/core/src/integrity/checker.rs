//! The per-file integrity pipeline.

use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::metadata::{AudioTags, LoftyMetadataReader, MetadataReader};

use super::config::IntegrityConfig;
use super::diagnostics::{classify_decode, DecodeClassification};
use super::error::ProbeError;
use super::ffmpeg::{FfmpegTailDecoder, FfprobeDurationProbe};
use super::traits::{DurationProbe, TailDecoder};
use super::types::{FailureReason, IntegrityCheck, IntegrityVerdict};

/// Container extension that is always DRM protected.
const DRM_EXTENSION: &str = "m4p";
/// Container extension whose codec is inspected for a DRM marker.
const DRM_CODEC_EXTENSION: &str = "m4a";

/// Runs the integrity checks for single files.
///
/// Checks run in a fixed order and the first failure ends the run. The
/// checker holds no per-file state, so one instance can serve many
/// concurrent checks.
pub struct IntegrityChecker {
    config: IntegrityConfig,
    reader: Arc<dyn MetadataReader>,
    probe: Arc<dyn DurationProbe>,
    decoder: Arc<dyn TailDecoder>,
}

impl IntegrityChecker {
    pub fn new(
        config: IntegrityConfig,
        reader: Arc<dyn MetadataReader>,
        probe: Arc<dyn DurationProbe>,
        decoder: Arc<dyn TailDecoder>,
    ) -> Self {
        Self {
            config,
            reader,
            probe,
            decoder,
        }
    }

    /// Creates a checker using lofty for tags and ffprobe/ffmpeg from `config`.
    pub fn with_system_tools(config: IntegrityConfig) -> Self {
        let probe = Arc::new(FfprobeDurationProbe::new(&config));
        let decoder = Arc::new(FfmpegTailDecoder::new(&config));
        Self::new(config, Arc::new(LoftyMetadataReader::new()), probe, decoder)
    }

    pub fn config(&self) -> &IntegrityConfig {
        &self.config
    }

    /// Checks one file. Never fails: every problem becomes part of the verdict.
    pub async fn check(&self, path: &Path) -> IntegrityVerdict {
        let mut verdict = IntegrityVerdict::pending(path);

        // 1. Existence
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return failed(verdict, FailureReason::MissingFile, "File does not exist");
        }
        verdict.pass(IntegrityCheck::Existence);

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        // 2. Metadata
        if extension == DRM_EXTENSION {
            verdict.pass(IntegrityCheck::Metadata);
            return failed(
                verdict,
                FailureReason::DrmProtected,
                "M4P files are DRM protected",
            );
        }

        let tags = match self.read_tags(path).await {
            Ok(tags) if tags.has_metadata() => tags,
            Ok(_) => return failed(verdict, FailureReason::NoMetadata, "No metadata found"),
            Err(reason) => {
                return failed(
                    verdict,
                    FailureReason::NoMetadata,
                    format!("Metadata read failed: {}", reason),
                )
            }
        };
        verdict.pass(IntegrityCheck::Metadata);

        // 3. DRM
        if extension == DRM_CODEC_EXTENSION {
            if let Some(codec) = self.drm_codec(path, &tags).await {
                return failed(
                    verdict,
                    FailureReason::DrmProtected,
                    format!("DRM protected codec '{}'", codec),
                );
            }
        }
        verdict.pass(IntegrityCheck::Drm);

        // 4. Truncation
        if let Some(tag_duration) = tags.duration_secs {
            verdict.tag_duration_secs = Some(tag_duration);
            match self.probe.probe_duration(path).await {
                Ok(actual) => {
                    verdict.probed_duration_secs = Some(actual);
                    let missing = tag_duration - actual;
                    if missing > self.config.truncation_tolerance_secs {
                        verdict.missing_seconds = Some(missing);
                        return failed(
                            verdict,
                            FailureReason::Truncated,
                            format!("File truncated: {:.1} seconds missing", missing),
                        );
                    }
                }
                Err(e) => {
                    debug!(
                        "Cannot verify duration of {} with {}: {}",
                        path.display(),
                        self.probe.name(),
                        e
                    );
                }
            }
        }
        verdict.pass(IntegrityCheck::Truncation);

        // 5. End-of-file decode
        let decode_failure = match self.decoder.decode_tail(path).await {
            Ok(outcome) => match classify_decode(&outcome) {
                DecodeClassification::Clean => None,
                DecodeClassification::Failed { reason } => Some(reason),
            },
            Err(ProbeError::Timeout { .. }) => {
                Some("Timeout during decode check (file may be corrupted)".to_string())
            }
            Err(e) if e.is_tool_missing() => {
                Some("FFmpeg not found (required for checking files)".to_string())
            }
            Err(e) => Some(format!("Decode check failed: {}", e)),
        };
        if let Some(reason) = decode_failure {
            return failed(verdict, FailureReason::DecodeFailure, reason);
        }
        verdict.pass(IntegrityCheck::EndDecode);

        verdict.succeed()
    }

    /// The protected codec of an MP4 file, from its tags or, failing that,
    /// from the probed sample-entry tag. A failed probe cannot prove DRM.
    async fn drm_codec(&self, path: &Path, tags: &AudioTags) -> Option<String> {
        if tags.is_drm_codec() {
            return tags.codec.clone();
        }

        match self.probe.probe_codec_tag(path).await {
            Ok(Some(tag)) if AudioTags::is_drm_codec_name(&tag) => Some(tag),
            Ok(_) => None,
            Err(e) => {
                debug!(
                    "Cannot read codec tag of {} with {}: {}",
                    path.display(),
                    self.probe.name(),
                    e
                );
                None
            }
        }
    }

    /// Reads tags off the async runtime; lofty does blocking file I/O.
    async fn read_tags(&self, path: &Path) -> Result<AudioTags, String> {
        let reader = Arc::clone(&self.reader);
        let owned = path.to_path_buf();
        match tokio::task::spawn_blocking(move || reader.read(&owned)).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(e) => Err(format!("metadata task failed: {}", e)),
        }
    }
}

fn failed(
    verdict: IntegrityVerdict,
    reason: FailureReason,
    detail: impl Into<String>,
) -> IntegrityVerdict {
    let detail = detail.into();
    debug!("{}: {} ({})", verdict.path.display(), reason, detail);
    verdict.fail(reason, detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrity::DecodeOutcome;
    use crate::testing::{fixtures, MockDecoder, MockDurationProbe, MockMetadataReader};
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Harness {
        _dir: TempDir,
        path: PathBuf,
        reader: Arc<MockMetadataReader>,
        probe: Arc<MockDurationProbe>,
        decoder: Arc<MockDecoder>,
        checker: IntegrityChecker,
    }

    fn harness(file_name: &str) -> Harness {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(file_name);
        std::fs::write(&path, b"audio").unwrap();

        let reader = Arc::new(MockMetadataReader::new());
        let probe = Arc::new(MockDurationProbe::new());
        let decoder = Arc::new(MockDecoder::new());
        let checker = IntegrityChecker::new(
            IntegrityConfig::default(),
            reader.clone(),
            probe.clone(),
            decoder.clone(),
        );

        Harness {
            _dir: dir,
            path,
            reader,
            probe,
            decoder,
            checker,
        }
    }

    #[tokio::test]
    async fn test_missing_file() {
        let h = harness("song.mp3");
        let missing = h.path.with_file_name("gone.mp3");

        let verdict = h.checker.check(&missing).await;
        assert!(!verdict.ok);
        assert_eq!(verdict.failure, Some(FailureReason::MissingFile));
        assert!(verdict.checks_passed.is_empty());
        assert_eq!(verdict.quarantine_bucket(), None);
    }

    #[tokio::test]
    async fn test_m4p_is_drm_without_reading_tags() {
        let h = harness("song.M4P");

        let verdict = h.checker.check(&h.path).await;
        assert_eq!(verdict.failure, Some(FailureReason::DrmProtected));
        assert_eq!(
            verdict.checks_passed,
            vec![IntegrityCheck::Existence, IntegrityCheck::Metadata]
        );
        assert_eq!(h.reader.read_count(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_tags_fail_no_metadata() {
        let h = harness("song.mp3");
        h.reader.set_error(&h.path, "not an audio file");

        let verdict = h.checker.check(&h.path).await;
        assert_eq!(verdict.failure, Some(FailureReason::NoMetadata));
        assert!(verdict.detail.unwrap().contains("not an audio file"));
    }

    #[tokio::test]
    async fn test_empty_tags_fail_no_metadata() {
        let h = harness("song.mp3");
        h.reader.set_tags(&h.path, Default::default());

        let verdict = h.checker.check(&h.path).await;
        assert_eq!(verdict.failure, Some(FailureReason::NoMetadata));
    }

    #[tokio::test]
    async fn test_m4a_drm_codec() {
        let h = harness("song.m4a");
        let mut tags = fixtures::audio_tags("Song", "Artist", 180.0);
        tags.codec = Some("DRMS".to_string());
        h.reader.set_tags(&h.path, tags);

        let verdict = h.checker.check(&h.path).await;
        assert_eq!(verdict.failure, Some(FailureReason::DrmProtected));
        assert_eq!(verdict.quarantine_bucket().map(|b| b.dir_name()), Some("drm"));
    }

    #[tokio::test]
    async fn test_m4a_drm_sample_entry_from_probe() {
        let h = harness("song.m4a");
        let mut tags = fixtures::audio_tags("Song", "Artist", 180.0);
        tags.codec = Some("Unknown".to_string());
        h.reader.set_tags(&h.path, tags);
        h.probe.set_codec_tag(&h.path, "drms").await;

        let verdict = h.checker.check(&h.path).await;
        assert_eq!(verdict.failure, Some(FailureReason::DrmProtected));
        assert!(verdict.detail.unwrap().contains("drms"));
        assert_eq!(
            verdict.checks_passed,
            vec![IntegrityCheck::Existence, IntegrityCheck::Metadata]
        );
        assert_eq!(h.decoder.decode_count().await, 0);
    }

    #[tokio::test]
    async fn test_m4a_plain_sample_entry_passes_drm() {
        let h = harness("song.m4a");
        h.reader
            .set_tags(&h.path, fixtures::audio_tags("Song", "Artist", 180.0));
        h.probe.set_codec_tag(&h.path, "mp4a").await;

        let verdict = h.checker.check(&h.path).await;
        assert!(verdict.ok);
        assert_eq!(h.probe.recorded_codec_tag_probes().await, vec![h.path.clone()]);
    }

    #[tokio::test]
    async fn test_codec_tag_only_probed_for_m4a() {
        let h = harness("song.mp3");
        h.reader
            .set_tags(&h.path, fixtures::audio_tags("Song", "Artist", 180.0));
        h.probe.set_codec_tag(&h.path, "drms").await;

        let verdict = h.checker.check(&h.path).await;
        assert!(verdict.ok);
        assert!(h.probe.recorded_codec_tag_probes().await.is_empty());
    }

    #[tokio::test]
    async fn test_small_duration_gap_passes() {
        let h = harness("song.mp3");
        h.reader
            .set_tags(&h.path, fixtures::audio_tags("Song", "Artist", 180.0));
        h.probe.set_duration(&h.path, 178.5).await;

        let verdict = h.checker.check(&h.path).await;
        assert!(verdict.ok, "{:?}", verdict);
        assert_eq!(verdict.failure, None);
        assert_eq!(verdict.checks_passed.len(), 5);
        assert_eq!(verdict.probed_duration_secs, Some(178.5));
        assert_eq!(h.decoder.decode_count().await, 1);
    }

    #[tokio::test]
    async fn test_truncated_file() {
        let h = harness("song.mp3");
        h.reader
            .set_tags(&h.path, fixtures::audio_tags("Song", "Artist", 180.0));
        h.probe.set_duration(&h.path, 170.0).await;

        let verdict = h.checker.check(&h.path).await;
        assert!(!verdict.ok);
        assert_eq!(verdict.failure, Some(FailureReason::Truncated));
        let missing = verdict.missing_seconds.unwrap();
        assert!((missing - 10.0).abs() < 1e-9);
        assert_eq!(h.decoder.decode_count().await, 0);
    }

    #[tokio::test]
    async fn test_probe_failure_does_not_fail_truncation() {
        let h = harness("song.mp3");
        h.reader
            .set_tags(&h.path, fixtures::audio_tags("Song", "Artist", 180.0));
        h.probe
            .set_next_error(ProbeError::Timeout { timeout_secs: 5 })
            .await;

        let verdict = h.checker.check(&h.path).await;
        assert!(verdict.ok);
        assert_eq!(verdict.probed_duration_secs, None);
    }

    #[tokio::test]
    async fn test_decode_failures() {
        let h = harness("song.mp3");
        h.reader
            .set_tags(&h.path, fixtures::audio_tags("Song", "Artist", 180.0));

        h.decoder
            .set_outcome(&h.path, DecodeOutcome::new(234, ""))
            .await;
        let verdict = h.checker.check(&h.path).await;
        assert_eq!(verdict.failure, Some(FailureReason::DecodeFailure));
        assert_eq!(
            verdict.detail.as_deref(),
            Some("File corrupted (FFmpeg code 234)")
        );
        assert_eq!(verdict.quarantine_bucket().map(|b| b.dir_name()), Some("corrupted"));

        h.decoder
            .set_outcome(&h.path, DecodeOutcome::new(0, "moov atom not found"))
            .await;
        let verdict = h.checker.check(&h.path).await;
        assert_eq!(verdict.failure, Some(FailureReason::DecodeFailure));

        h.decoder
            .set_next_error(ProbeError::FfmpegNotFound {
                path: PathBuf::from("ffmpeg"),
            })
            .await;
        let verdict = h.checker.check(&h.path).await;
        assert_eq!(verdict.failure, Some(FailureReason::DecodeFailure));
        assert!(verdict.detail.unwrap().contains("not found"));
    }
}
