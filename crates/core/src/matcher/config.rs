//! Configuration for the matcher module.
//!
//! The defaults are empirically tuned values carried over from long use on
//! real libraries. They have no derivation; change them with care.

use serde::{Deserialize, Serialize};

/// Score at or above which the top candidate is accepted without review.
pub const DEFAULT_AUTO_ACCEPT_THRESHOLD: u8 = 88;

/// Points awarded per signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub exact_size: u32,
    pub close_size: u32,
    /// Sizes closer than this many bytes count as "close".
    pub close_size_bytes: u64,
    /// Duration within 1 second.
    pub exact_duration: u32,
    /// Duration within 3 seconds.
    pub close_duration: u32,
    /// Duration within 10 seconds.
    pub reasonable_duration: u32,
    /// Normalized filename contains the normalized track name.
    pub exact_track_name: u32,
    /// Word-boundary bonus on an exact name, and the scale of fuzzy matches.
    pub fuzzy_track_name: u32,
    /// Fuzzy similarity (0-100) must exceed this to count.
    pub fuzzy_floor: u32,
    pub artist_in_filename: u32,
    pub artist_in_directory: u32,
    /// Stacks on `artist_in_directory` when the immediate parent matches.
    pub artist_in_parent_dir: u32,
    pub album_in_parent_dir: u32,
    pub album_in_grandparent_dir: u32,
    pub track_number_start: u32,
    pub track_number_anywhere: u32,
    pub proper_extension: u32,
    /// Extensions earning `proper_extension`, lowercase without the dot.
    pub proper_extensions: Vec<String>,
    pub year_match: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            exact_size: 15,
            close_size: 5,
            close_size_bytes: 1000,
            exact_duration: 10,
            close_duration: 5,
            reasonable_duration: 2,
            exact_track_name: 40,
            fuzzy_track_name: 20,
            fuzzy_floor: 60,
            artist_in_filename: 10,
            artist_in_directory: 15,
            artist_in_parent_dir: 5,
            album_in_parent_dir: 10,
            album_in_grandparent_dir: 5,
            track_number_start: 5,
            track_number_anywhere: 2,
            proper_extension: 1,
            proper_extensions: ["mp3", "m4a", "aac", "flac"]
                .into_iter()
                .map(String::from)
                .collect(),
            year_match: 2,
        }
    }
}

/// A filename keyword that marks a wrong match for one specific title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownMismatch {
    pub filename_keyword: String,
    pub track_name: String,
}

/// Points subtracted per penalty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorePenalties {
    /// Filename contains one of `wrong_content_keywords`.
    pub wrong_content: u32,
    pub wrong_content_keywords: Vec<String>,
    /// Short track name matched with no artist evidence.
    pub short_name_no_artist: u32,
    pub short_name_max_chars: usize,
    pub known_mismatch: u32,
    pub known_mismatches: Vec<KnownMismatch>,
}

impl Default for ScorePenalties {
    fn default() -> Self {
        Self {
            wrong_content: 20,
            wrong_content_keywords: [
                "podcast",
                "audiobook",
                "interview",
                "radio",
                "neil goldberg",
                "griffin technology",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            short_name_no_artist: 10,
            short_name_max_chars: 6,
            known_mismatch: 5,
            known_mismatches: vec![KnownMismatch {
                filename_keyword: "ghetto".to_string(),
                track_name: "life".to_string(),
            }],
        }
    }
}

/// Configuration for [`TrackMatcher`](super::TrackMatcher).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    #[serde(default)]
    pub weights: ScoreWeights,

    #[serde(default)]
    pub penalties: ScorePenalties,

    /// Top score needed for automatic acceptance.
    #[serde(default = "default_auto_accept_threshold")]
    pub auto_accept_threshold: u8,

    /// A lone candidate scoring above this is accepted even below
    /// `auto_accept_threshold`.
    #[serde(default = "default_single_candidate_threshold")]
    pub single_candidate_threshold: u8,

    /// Score needed for a candidate to replace a library file unattended.
    #[serde(default = "default_auto_replace_threshold")]
    pub auto_replace_threshold: u8,

    /// Minimum best-match score when the artist was corroborated.
    #[serde(default = "default_min_score_with_artist")]
    pub min_score_with_artist: u8,

    /// Minimum best-match score without artist corroboration.
    #[serde(default = "default_min_score_without_artist")]
    pub min_score_without_artist: u8,
}

fn default_auto_accept_threshold() -> u8 {
    DEFAULT_AUTO_ACCEPT_THRESHOLD
}

fn default_single_candidate_threshold() -> u8 {
    70
}

fn default_auto_replace_threshold() -> u8 {
    50
}

fn default_min_score_with_artist() -> u8 {
    10
}

fn default_min_score_without_artist() -> u8 {
    15
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            penalties: ScorePenalties::default(),
            auto_accept_threshold: default_auto_accept_threshold(),
            single_candidate_threshold: default_single_candidate_threshold(),
            auto_replace_threshold: default_auto_replace_threshold(),
            min_score_with_artist: default_min_score_with_artist(),
            min_score_without_artist: default_min_score_without_artist(),
        }
    }
}

impl MatcherConfig {
    /// Sets the auto-accept threshold.
    pub fn with_auto_accept_threshold(mut self, threshold: u8) -> Self {
        self.auto_accept_threshold = threshold;
        self
    }

    /// Sets the auto-replace threshold.
    pub fn with_auto_replace_threshold(mut self, threshold: u8) -> Self {
        self.auto_replace_threshold = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let config = MatcherConfig::default();
        assert_eq!(config.auto_accept_threshold, 88);
        assert_eq!(config.single_candidate_threshold, 70);
        assert_eq!(config.auto_replace_threshold, 50);
        assert_eq!(config.min_score_with_artist, 10);
        assert_eq!(config.min_score_without_artist, 15);
    }

    #[test]
    fn test_default_weights() {
        let weights = ScoreWeights::default();
        assert_eq!(weights.exact_track_name, 40);
        assert_eq!(weights.fuzzy_track_name, 20);
        assert_eq!(weights.artist_in_directory, 15);
        assert!(weights.proper_extensions.contains(&"flac".to_string()));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let toml = r#"
auto_accept_threshold = 90

[weights]
exact_size = 20

[penalties]
wrong_content_keywords = ["karaoke"]
"#;
        let config: MatcherConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.auto_accept_threshold, 90);
        assert_eq!(config.weights.exact_size, 20);
        assert_eq!(config.weights.close_size, 5);
        assert_eq!(config.penalties.wrong_content_keywords, vec!["karaoke"]);
        assert_eq!(config.penalties.wrong_content, 20);
        assert_eq!(config.auto_replace_threshold, 50);
    }
}
