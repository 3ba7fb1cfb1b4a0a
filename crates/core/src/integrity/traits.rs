//! Trait definitions for the integrity module.

use async_trait::async_trait;
use std::path::Path;

use super::error::ProbeError;
use super::types::DecodeOutcome;

/// Reads stream facts straight from the container: the actual duration and
/// the audio sample-entry tag.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    /// Returns the name of this probe implementation.
    fn name(&self) -> &str;

    /// Duration in seconds.
    async fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError>;

    /// Fourcc of the first audio stream's sample entry (e.g. `mp4a`,
    /// `drms`), or `None` when the container does not report one.
    async fn probe_codec_tag(&self, path: &Path) -> Result<Option<String>, ProbeError>;
}

/// Decodes the last few seconds of a file.
#[async_trait]
pub trait TailDecoder: Send + Sync {
    /// Returns the name of this decoder implementation.
    fn name(&self) -> &str;

    /// Decodes a short window near the end of the file and reports how the
    /// decoder exited. Interpreting the outcome is left to
    /// [`classify_decode`](super::classify_decode).
    async fn decode_tail(&self, path: &Path) -> Result<DecodeOutcome, ProbeError>;
}
