//! FFmpeg-based duration probe and tail decoder.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::config::IntegrityConfig;
use super::error::ProbeError;
use super::traits::{DurationProbe, TailDecoder};
use super::types::DecodeOutcome;

fn spawn_error(e: std::io::Error, not_found: impl FnOnce() -> ProbeError) -> ProbeError {
    if e.kind() == std::io::ErrorKind::NotFound {
        not_found()
    } else {
        ProbeError::Io(e)
    }
}

/// Duration probe backed by `ffprobe`.
pub struct FfprobeDurationProbe {
    ffprobe_path: PathBuf,
    timeout_secs: u64,
}

impl FfprobeDurationProbe {
    pub fn new(config: &IntegrityConfig) -> Self {
        Self {
            ffprobe_path: config.ffprobe_path.clone(),
            timeout_secs: config.probe_timeout_secs,
        }
    }

    fn build_args(path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            path.to_string_lossy().to_string(),
        ]
    }

    fn build_codec_tag_args(path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-select_streams".to_string(),
            "a:0".to_string(),
            "-show_entries".to_string(),
            "stream=codec_tag_string".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            path.to_string_lossy().to_string(),
        ]
    }

    /// Parses the codec tag ffprobe prints. Streams without a fourcc are
    /// printed as `[0][0][0][0]`.
    fn parse_codec_tag(stdout: &str) -> Option<String> {
        let tag = stdout.lines().next().unwrap_or_default().trim();
        if tag.is_empty() || tag.starts_with('[') {
            None
        } else {
            Some(tag.to_string())
        }
    }

    /// Runs ffprobe and returns its stdout.
    async fn run(&self, args: Vec<String>) -> Result<String, ProbeError> {
        let run = Command::new(&self.ffprobe_path)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match timeout(Duration::from_secs(self.timeout_secs), run).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(spawn_error(e, || ProbeError::FfprobeNotFound {
                    path: self.ffprobe_path.clone(),
                }))
            }
            Err(_) => {
                return Err(ProbeError::Timeout {
                    timeout_secs: self.timeout_secs,
                })
            }
        };

        if !output.status.success() {
            return Err(ProbeError::probe_failed(format!(
                "ffprobe exited with code {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Parses the single duration value ffprobe prints.
    fn parse_duration(stdout: &str) -> Result<f64, ProbeError> {
        let value = stdout.trim();
        if value.is_empty() {
            return Err(ProbeError::parse_error("empty ffprobe output"));
        }
        let duration: f64 = value
            .parse()
            .map_err(|e| ProbeError::parse_error(format!("'{}': {}", value, e)))?;
        if !duration.is_finite() || duration < 0.0 {
            return Err(ProbeError::parse_error(format!("invalid duration '{}'", value)));
        }
        Ok(duration)
    }
}

#[async_trait]
impl DurationProbe for FfprobeDurationProbe {
    fn name(&self) -> &str {
        "ffprobe"
    }

    async fn probe_duration(&self, path: &Path) -> Result<f64, ProbeError> {
        let stdout = self.run(Self::build_args(path)).await?;
        Self::parse_duration(&stdout)
    }

    async fn probe_codec_tag(&self, path: &Path) -> Result<Option<String>, ProbeError> {
        let stdout = self.run(Self::build_codec_tag_args(path)).await?;
        let tag = Self::parse_codec_tag(&stdout);
        debug!("ffprobe codec tag of {}: {:?}", path.display(), tag);
        Ok(tag)
    }
}

/// Tail decoder backed by `ffmpeg`, decoding to a null sink.
pub struct FfmpegTailDecoder {
    ffmpeg_path: PathBuf,
    timeout_secs: u64,
    tail_seek_secs: u64,
    decode_window_secs: u64,
}

impl FfmpegTailDecoder {
    pub fn new(config: &IntegrityConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            timeout_secs: config.decode_timeout_secs,
            tail_seek_secs: config.tail_seek_secs,
            decode_window_secs: config.decode_window_secs,
        }
    }

    fn build_args(&self, path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            // Negative seek is relative to the end of the input
            "-ss".to_string(),
            format!("-{}", self.tail_seek_secs),
            "-i".to_string(),
            path.to_string_lossy().to_string(),
            "-t".to_string(),
            self.decode_window_secs.to_string(),
            "-f".to_string(),
            "null".to_string(),
            "-".to_string(),
        ]
    }
}

#[async_trait]
impl TailDecoder for FfmpegTailDecoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn decode_tail(&self, path: &Path) -> Result<DecodeOutcome, ProbeError> {
        let mut child = Command::new(&self.ffmpeg_path)
            .args(self.build_args(path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                spawn_error(e, || ProbeError::FfmpegNotFound {
                    path: self.ffmpeg_path.clone(),
                })
            })?;

        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ProbeError::probe_failed("ffmpeg stderr was not captured"))?;

        let timeout_duration = Duration::from_secs(self.timeout_secs);
        let result = timeout(timeout_duration, async {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf).await?;
            let status = child.wait().await?;
            Ok::<(std::process::ExitStatus, Vec<u8>), std::io::Error>((status, buf))
        })
        .await;

        match result {
            Ok(Ok((status, buf))) => {
                let outcome = DecodeOutcome {
                    exit_code: status.code(),
                    stderr: String::from_utf8_lossy(&buf).into_owned(),
                };
                debug!(
                    "ffmpeg tail decode of {} exited with {:?}",
                    path.display(),
                    outcome.exit_code
                );
                Ok(outcome)
            }
            Ok(Err(e)) => Err(ProbeError::Io(e)),
            Err(_) => {
                let _ = child.kill().await;
                Err(ProbeError::Timeout {
                    timeout_secs: self.timeout_secs,
                })
            }
        }
    }
}
