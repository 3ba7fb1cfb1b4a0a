//! Mock duration probe and tail decoder for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::integrity::{DecodeOutcome, DurationProbe, ProbeError, TailDecoder};

/// Mock implementation of the DurationProbe trait.
///
/// Paths without a configured duration fail with `ProbeFailed`, which the
/// integrity checker treats as "cannot verify". Paths without a configured
/// codec tag report none.
#[derive(Debug, Default)]
pub struct MockDurationProbe {
    durations: Arc<RwLock<HashMap<PathBuf, f64>>>,
    codec_tags: Arc<RwLock<HashMap<PathBuf, String>>>,
    default_duration: Arc<RwLock<Option<f64>>>,
    /// If set, the next probe will fail with this error.
    next_error: Arc<RwLock<Option<ProbeError>>>,
    probes: Arc<RwLock<Vec<PathBuf>>>,
    codec_tag_probes: Arc<RwLock<Vec<PathBuf>>>,
}

impl MockDurationProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the probed duration for a path.
    pub async fn set_duration(&self, path: impl AsRef<Path>, secs: f64) {
        self.durations
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), secs);
    }

    /// Set the sample-entry tag reported for a path.
    pub async fn set_codec_tag(&self, path: impl AsRef<Path>, tag: impl Into<String>) {
        self.codec_tags
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), tag.into());
    }

    /// Set the duration for unconfigured paths.
    pub async fn set_default_duration(&self, secs: f64) {
        *self.default_duration.write().await = Some(secs);
    }

    /// Configure the next probe to fail with the given error.
    pub async fn set_next_error(&self, error: ProbeError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get all probed paths.
    pub async fn recorded_probes(&self) -> Vec<PathBuf> {
        self.probes.read().await.clone()
    }

    /// Get all paths whose codec tag was requested.
    pub async fn recorded_codec_tag_probes(&self) -> Vec<PathBuf> {
        self.codec_tag_probes.read().await.clone()
    }
}

#[async_trait]
impl DurationProbe for MockDurationProbe {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError> {
        self.probes.write().await.push(path.to_path_buf());

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        if let Some(secs) = self.durations.read().await.get(path) {
            return Ok(*secs);
        }

        (*self.default_duration.read().await)
            .ok_or_else(|| ProbeError::probe_failed("no duration configured"))
    }

    async fn probe_codec_tag(&self, path: &Path) -> Result<Option<String>, ProbeError> {
        self.codec_tag_probes.write().await.push(path.to_path_buf());
        Ok(self.codec_tags.read().await.get(path).cloned())
    }
}

/// Mock implementation of the TailDecoder trait.
///
/// Paths without a configured outcome decode cleanly.
#[derive(Debug, Default)]
pub struct MockDecoder {
    outcomes: Arc<RwLock<HashMap<PathBuf, DecodeOutcome>>>,
    /// If set, the next decode will fail with this error.
    next_error: Arc<RwLock<Option<ProbeError>>>,
    decodes: Arc<RwLock<Vec<PathBuf>>>,
}

impl MockDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the decode outcome for a path.
    pub async fn set_outcome(&self, path: impl AsRef<Path>, outcome: DecodeOutcome) {
        self.outcomes
            .write()
            .await
            .insert(path.as_ref().to_path_buf(), outcome);
    }

    /// Configure the next decode to fail with the given error.
    pub async fn set_next_error(&self, error: ProbeError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get all decoded paths.
    pub async fn recorded_decodes(&self) -> Vec<PathBuf> {
        self.decodes.read().await.clone()
    }

    /// Get the number of decodes performed.
    pub async fn decode_count(&self) -> usize {
        self.decodes.read().await.len()
    }
}

#[async_trait]
impl TailDecoder for MockDecoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn decode_tail(&self, path: &Path) -> Result<DecodeOutcome, ProbeError> {
        self.decodes.write().await.push(path.to_path_buf());

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        Ok(self
            .outcomes
            .read()
            .await
            .get(path)
            .cloned()
            .unwrap_or_else(DecodeOutcome::clean))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_configuration() {
        let probe = MockDurationProbe::new();
        assert!(probe.probe_duration(Path::new("/a.mp3")).await.is_err());

        probe.set_duration("/a.mp3", 120.0).await;
        assert_eq!(probe.probe_duration(Path::new("/a.mp3")).await.unwrap(), 120.0);

        probe.set_next_error(ProbeError::Timeout { timeout_secs: 5 }).await;
        assert!(probe.probe_duration(Path::new("/a.mp3")).await.is_err());
        assert!(probe.probe_duration(Path::new("/a.mp3")).await.is_ok());
        assert_eq!(probe.recorded_probes().await.len(), 4);
    }

    #[tokio::test]
    async fn test_decoder_defaults_to_clean() {
        let decoder = MockDecoder::new();
        assert_eq!(
            decoder.decode_tail(Path::new("/a.mp3")).await.unwrap(),
            DecodeOutcome::clean()
        );

        decoder
            .set_outcome("/a.mp3", DecodeOutcome::new(1, "warning"))
            .await;
        assert_eq!(
            decoder.decode_tail(Path::new("/a.mp3")).await.unwrap().exit_code,
            Some(1)
        );
        assert_eq!(decoder.decode_count().await, 2);
    }
}
