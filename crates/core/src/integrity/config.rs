//! Configuration for the integrity module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the external tools used by the integrity checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Path to ffprobe binary.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// Timeout for a duration probe in seconds.
    #[serde(default = "default_timeout")]
    pub probe_timeout_secs: u64,

    /// Timeout for the end-of-file decode in seconds.
    #[serde(default = "default_timeout")]
    pub decode_timeout_secs: u64,

    /// How far before the end of the file decoding starts.
    #[serde(default = "default_tail_seek")]
    pub tail_seek_secs: u64,

    /// How much audio is decoded.
    #[serde(default = "default_decode_window")]
    pub decode_window_secs: u64,

    /// Tag duration may exceed the probed duration by this much before the
    /// file counts as truncated.
    #[serde(default = "default_truncation_tolerance")]
    pub truncation_tolerance_secs: f64,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_timeout() -> u64 {
    5
}

fn default_tail_seek() -> u64 {
    10
}

fn default_decode_window() -> u64 {
    1
}

fn default_truncation_tolerance() -> f64 {
    1.0
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            probe_timeout_secs: default_timeout(),
            decode_timeout_secs: default_timeout(),
            tail_seek_secs: default_tail_seek(),
            decode_window_secs: default_decode_window(),
            truncation_tolerance_secs: default_truncation_tolerance(),
        }
    }
}

impl IntegrityConfig {
    pub fn with_ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg_path = path.into();
        self
    }

    pub fn with_ffprobe_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffprobe_path = path.into();
        self
    }

    pub fn with_timeouts(mut self, probe_secs: u64, decode_secs: u64) -> Self {
        self.probe_timeout_secs = probe_secs;
        self.decode_timeout_secs = decode_secs;
        self
    }

    pub fn with_truncation_tolerance(mut self, secs: f64) -> Self {
        self.truncation_tolerance_secs = secs;
        self
    }
}
