//! Interpretation of decoder exit codes and diagnostic text.
//!
//! The decoder has no structured error channel, so corruption is recognized
//! from its exit code and known phrases in its stderr. The phrase list lives
//! here and nowhere else.

use super::types::DecodeOutcome;

/// Exit code ffmpeg uses for corrupt input.
pub const CORRUPT_EXIT_CODE: i32 = 234;

/// Lowercase stderr phrase and the reason reported for it, in match order.
const FAILURE_PHRASES: &[(&str, &str)] = &[
    ("error decoding", "Decoding error at end of file"),
    ("truncated", "File is truncated"),
    ("invalid data", "Invalid data found in file"),
    ("could not find codec", "Codec not found"),
    ("moov atom not found", "Missing moov atom (corrupted MP4/M4A)"),
    ("incomplete frame", "Incomplete MP3 frame (partial file)"),
    ("premature end", "Premature end of file"),
];

/// Exit codes that count as success when no failure phrase matched.
/// 1 is how ffmpeg reports warnings.
const ACCEPTED_EXIT_CODES: &[i32] = &[0, 1];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeClassification {
    Clean,
    Failed { reason: String },
}

impl DecodeClassification {
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }

    fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

/// Classifies a decoder run.
pub fn classify_decode(outcome: &DecodeOutcome) -> DecodeClassification {
    if outcome.exit_code == Some(CORRUPT_EXIT_CODE) {
        return DecodeClassification::failed(format!(
            "File corrupted (FFmpeg code {})",
            CORRUPT_EXIT_CODE
        ));
    }

    let stderr = outcome.stderr.to_lowercase();
    if let Some((_, reason)) = FAILURE_PHRASES
        .iter()
        .find(|(phrase, _)| stderr.contains(phrase))
    {
        return DecodeClassification::failed(*reason);
    }

    match outcome.exit_code {
        Some(code) if ACCEPTED_EXIT_CODES.contains(&code) => DecodeClassification::Clean,
        Some(code) => DecodeClassification::failed(format!("FFmpeg failed with code {}", code)),
        None => DecodeClassification::failed("FFmpeg terminated by signal"),
    }
}
