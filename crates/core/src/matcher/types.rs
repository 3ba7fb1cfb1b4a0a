//! Types for the matcher module.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::index::CandidateFile;

/// The wanted track, used as the query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
}

impl TrackDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    pub fn with_duration(mut self, duration_secs: f64) -> Self {
        self.duration_secs = Some(duration_secs);
        self
    }

    pub fn with_track_number(mut self, track_number: u32) -> Self {
        self.track_number = Some(track_number);
        self
    }

    pub fn with_year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }
}

/// How one candidate scored against a track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Final score, clamped to 0..=100.
    pub score: u8,
    /// Positive contributions by signal name.
    pub contributions: BTreeMap<String, u32>,
    /// Penalties by name.
    pub penalties: BTreeMap<String, u32>,
    /// The artist was found in the filename or directory path.
    pub artist_match: bool,
    /// The track name matched exactly or fuzzily.
    pub track_match: bool,
}

impl ScoreBreakdown {
    pub(crate) fn add(&mut self, signal: &str, points: u32) {
        if points > 0 {
            self.contributions.insert(signal.to_string(), points);
        }
    }

    pub(crate) fn penalize(&mut self, penalty: &str, points: u32) {
        if points > 0 {
            self.penalties.insert(penalty.to_string(), points);
        }
    }

    /// Sum of contributions minus penalties, clamped to 0..=100.
    pub(crate) fn finish(mut self) -> Self {
        let gained: i64 = self.contributions.values().map(|&p| i64::from(p)).sum();
        let lost: i64 = self.penalties.values().map(|&p| i64::from(p)).sum();
        self.score = (gained - lost).clamp(0, 100) as u8;
        self
    }

    /// Human-readable one-line explanation, e.g.
    /// `"exact_track_name +40, artist_in_directory +15, wrong_content -20"`.
    pub fn summary(&self) -> String {
        let parts: Vec<String> = self
            .contributions
            .iter()
            .map(|(name, points)| format!("{} +{}", name, points))
            .chain(
                self.penalties
                    .iter()
                    .map(|(name, points)| format!("{} -{}", name, points)),
            )
            .collect();

        if parts.is_empty() {
            "no matching signals".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// A candidate with its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: CandidateFile,
    pub breakdown: ScoreBreakdown,
}

impl ScoredCandidate {
    pub fn score(&self) -> u8 {
        self.breakdown.score
    }
}

/// Why a candidate was accepted without review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptReason {
    /// Sole holder of a top score at or above the threshold.
    TopScore,
    /// Several candidates tied at the top; picked by the tie-break rule.
    TieBreak,
    /// The only candidate, scoring above the secondary bar.
    SingleCandidate,
}

/// Outcome of [`TrackMatcher::decide`](super::TrackMatcher::decide).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// Accepted without review.
    AutoAccept {
        candidate: ScoredCandidate,
        reason: AcceptReason,
    },
    /// A human (or other external policy) must choose from the ranking.
    NeedsReview { ranked: Vec<ScoredCandidate> },
    /// Nothing to choose from.
    NoCandidates,
}

impl Decision {
    /// The auto-accepted candidate, if any.
    pub fn accepted(&self) -> Option<&ScoredCandidate> {
        match self {
            Decision::AutoAccept { candidate, .. } => Some(candidate),
            _ => None,
        }
    }

    /// Resolves the decision, asking `choose` to pick an index from the
    /// ranking when review is needed. Returning `None` skips the track.
    pub fn resolve_with<F>(self, choose: F) -> Option<ScoredCandidate>
    where
        F: FnOnce(&[ScoredCandidate]) -> Option<usize>,
    {
        match self {
            Decision::AutoAccept { candidate, .. } => Some(candidate),
            Decision::NeedsReview { mut ranked } => {
                let index = choose(&ranked)?;
                (index < ranked.len()).then(|| ranked.swap_remove(index))
            }
            Decision::NoCandidates => None,
        }
    }
}
