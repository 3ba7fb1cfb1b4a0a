//! Multi-signal candidate scoring.

use std::path::Path;
use tracing::{debug, info, warn};

use crate::index::CandidateFile;
use crate::text::{contains_word, normalize, partial_ratio};

use super::config::MatcherConfig;
use super::decision::decide_ranked;
use super::types::{Decision, ScoreBreakdown, ScoredCandidate, TrackDescriptor};

/// Duration differences (seconds) for the exact, close and reasonable tiers.
const EXACT_DURATION_SECS: f64 = 1.0;
const CLOSE_DURATION_SECS: f64 = 3.0;
const REASONABLE_DURATION_SECS: f64 = 10.0;

/// Scores candidate files against a wanted track.
///
/// Every comparison runs on strings produced by [`normalize`], the same
/// function the search index uses for its keys.
#[derive(Debug, Clone, Default)]
pub struct TrackMatcher {
    config: MatcherConfig,
}

/// Normalized strings derived once per candidate.
struct CandidateText {
    filename: String,
    full_path: String,
    parent_dir: String,
    grandparent_dir: String,
}

impl CandidateText {
    fn from_path(path: &Path) -> Self {
        let parent = path.parent();
        let dir_name = |p: Option<&Path>| {
            p.and_then(Path::file_name)
                .map(|n| normalize(&n.to_string_lossy()))
                .unwrap_or_default()
        };

        Self {
            filename: path
                .file_name()
                .map(|n| normalize(&n.to_string_lossy()))
                .unwrap_or_default(),
            full_path: parent
                .map(|p| normalize(&p.to_string_lossy()))
                .unwrap_or_default(),
            parent_dir: dir_name(parent),
            grandparent_dir: dir_name(parent.and_then(Path::parent)),
        }
    }
}

impl TrackMatcher {
    /// Creates a matcher with default weights and thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a matcher with custom configuration.
    pub fn with_config(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Scores one candidate against `track`.
    pub fn score(&self, track: &TrackDescriptor, candidate: &CandidateFile) -> ScoreBreakdown {
        let weights = &self.config.weights;
        let penalties = &self.config.penalties;
        let text = CandidateText::from_path(&candidate.path);
        let mut breakdown = ScoreBreakdown::default();

        let track_name = normalize(&track.name);
        let artist = non_empty(track.artist.as_deref().map(normalize));
        let album = non_empty(track.album.as_deref().map(normalize));

        // Size
        if let Some(size) = track.size_bytes.filter(|&s| s > 0) {
            if candidate.size_bytes > 0 {
                if size == candidate.size_bytes {
                    breakdown.add("exact_size", weights.exact_size);
                } else if size.abs_diff(candidate.size_bytes) < weights.close_size_bytes {
                    breakdown.add("close_size", weights.close_size);
                }
            }
        }

        // Duration
        if let (Some(wanted), Some(actual)) = (
            track.duration_secs.filter(|&d| d > 0.0),
            candidate.duration_secs.filter(|&d| d > 0.0),
        ) {
            let diff = (wanted - actual).abs();
            if diff <= EXACT_DURATION_SECS {
                breakdown.add("exact_duration", weights.exact_duration);
            } else if diff <= CLOSE_DURATION_SECS {
                breakdown.add("close_duration", weights.close_duration);
            } else if diff <= REASONABLE_DURATION_SECS {
                breakdown.add("reasonable_duration", weights.reasonable_duration);
            }
        }

        // Track name
        if !track_name.is_empty() {
            if text.filename.contains(&track_name) {
                breakdown.add("exact_track_name", weights.exact_track_name);
                breakdown.track_match = true;
                if contains_word(&text.filename, &track_name) {
                    breakdown.add("word_boundary_bonus", weights.fuzzy_track_name);
                }
            } else {
                let similarity = partial_ratio(&track_name, &text.filename);
                if similarity > weights.fuzzy_floor {
                    breakdown.add(
                        "fuzzy_track_name",
                        weights.fuzzy_track_name * similarity / 100,
                    );
                    breakdown.track_match = true;
                }
            }
        }

        // Artist
        if let Some(artist) = artist.as_deref() {
            if text.filename.contains(artist) {
                breakdown.add("artist_in_filename", weights.artist_in_filename);
                breakdown.artist_match = true;
            }
            if text.full_path.contains(artist) {
                breakdown.add("artist_in_directory", weights.artist_in_directory);
                breakdown.artist_match = true;
                if text.parent_dir.contains(artist) {
                    breakdown.add("artist_in_parent_dir", weights.artist_in_parent_dir);
                }
            }
        }

        // Album
        if let Some(album) = album.as_deref() {
            if text.parent_dir.contains(album) {
                breakdown.add("album_in_parent_dir", weights.album_in_parent_dir);
            } else if text.grandparent_dir.contains(album) {
                breakdown.add("album_in_grandparent_dir", weights.album_in_grandparent_dir);
            }
        }

        // Track number
        if let Some(number) = track.track_number.filter(|&n| n > 0) {
            if starts_with_track_number(&text.filename, number) {
                breakdown.add("track_number_start", weights.track_number_start);
            } else if text.filename.contains(&format!("{:02}", number))
                || text.filename.contains(&number.to_string())
            {
                breakdown.add("track_number_anywhere", weights.track_number_anywhere);
            }
        }

        // Extension
        let extension = candidate
            .path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if weights.proper_extensions.iter().any(|e| *e == extension) {
            breakdown.add("proper_extension", weights.proper_extension);
        }

        // Year
        if let Some(year) = track.year {
            let year = year.to_string();
            if text.full_path.contains(&year) || text.filename.contains(&year) {
                breakdown.add("year_match", weights.year_match);
            }
        }

        // Penalties
        if penalties
            .wrong_content_keywords
            .iter()
            .any(|keyword| text.filename.contains(keyword.as_str()))
        {
            breakdown.penalize("wrong_content", penalties.wrong_content);
        }

        if track_name.chars().count() <= penalties.short_name_max_chars
            && breakdown.track_match
            && !breakdown.artist_match
        {
            debug!(
                "Short track name '{}' matched without artist evidence",
                track.name
            );
            breakdown.penalize("short_name_no_artist", penalties.short_name_no_artist);
        }

        if penalties.known_mismatches.iter().any(|m| {
            text.filename.contains(m.filename_keyword.as_str())
                && track_name == normalize(&m.track_name)
        }) {
            breakdown.penalize("known_mismatch", penalties.known_mismatch);
        }

        breakdown.finish()
    }

    /// Scores every candidate and sorts them by score, highest first.
    ///
    /// Candidates with equal scores keep their input order.
    pub fn rank(&self, track: &TrackDescriptor, candidates: &[CandidateFile]) -> Vec<ScoredCandidate> {
        let mut ranked: Vec<ScoredCandidate> = candidates
            .iter()
            .map(|candidate| ScoredCandidate {
                breakdown: self.score(track, candidate),
                candidate: candidate.clone(),
            })
            .collect();
        ranked.sort_by(|a, b| b.score().cmp(&a.score()));
        ranked
    }

    /// The top-ranked candidate if it clears the minimum score.
    ///
    /// The minimum is lower when the artist was found in the candidate's
    /// path or filename.
    pub fn best_match(
        &self,
        track: &TrackDescriptor,
        candidates: &[CandidateFile],
    ) -> Option<ScoredCandidate> {
        let best = self.rank(track, candidates).into_iter().next()?;

        let minimum = if best.breakdown.artist_match {
            self.config.min_score_with_artist
        } else {
            self.config.min_score_without_artist
        };

        info!(
            "Best match for '{}': {} (score {})",
            track.name,
            best.candidate.path.display(),
            best.score()
        );
        debug!("Score breakdown: {}", best.breakdown.summary());

        if best.score() >= minimum {
            Some(best)
        } else {
            warn!(
                "Best match score {} below threshold {}",
                best.score(),
                minimum
            );
            None
        }
    }

    /// Whether a scored candidate may replace a library file unattended.
    pub fn is_auto_replace_candidate(&self, breakdown: &ScoreBreakdown) -> bool {
        breakdown.score >= self.config.auto_replace_threshold
    }

    /// Ranks `candidates` and decides whether one can be accepted without
    /// review at `auto_accept_threshold`.
    pub fn decide(
        &self,
        track: &TrackDescriptor,
        candidates: &[CandidateFile],
        auto_accept_threshold: u8,
    ) -> Decision {
        let ranked = self.rank(track, candidates);
        let decision = decide_ranked(
            ranked,
            auto_accept_threshold,
            self.config.single_candidate_threshold,
        );
        debug!("Decision for '{}': {}", track.name, decision_kind(&decision));
        decision
    }
}

fn decision_kind(decision: &Decision) -> &'static str {
    match decision {
        Decision::AutoAccept { .. } => "auto_accept",
        Decision::NeedsReview { .. } => "needs_review",
        Decision::NoCandidates => "no_candidates",
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Whether `filename` starts with optional zeros, then `number`, then a
/// non-digit.
fn starts_with_track_number(filename: &str, number: u32) -> bool {
    let digits = number.to_string();
    filename
        .trim_start_matches('0')
        .strip_prefix(digits.as_str())
        .and_then(|rest| rest.chars().next())
        .is_some_and(|next| !next.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn candidate(path: &str, size: u64, duration: Option<f64>) -> CandidateFile {
        CandidateFile {
            path: PathBuf::from(path),
            size_bytes: size,
            duration_secs: duration,
            tags: None,
        }
    }

    #[test]
    fn test_exact_stem_gets_name_bonus() {
        let matcher = TrackMatcher::new();
        let track = TrackDescriptor::new("Wish You Were Here");
        let score = matcher.score(&track, &candidate("/x/Wish You Were Here.ogg", 1, None));
        assert!(score.score >= 40);
        assert!(score.track_match);
        assert_eq!(score.contributions.get("exact_track_name"), Some(&40));
        assert_eq!(score.contributions.get("word_boundary_bonus"), Some(&20));
    }

    #[test]
    fn test_full_match_is_auto_replace_eligible() {
        let matcher = TrackMatcher::new();
        let track = TrackDescriptor::new("Karma Police")
            .with_artist("Radiohead")
            .with_size(7_654_321)
            .with_duration(264.0);
        let file = candidate("/music/Radiohead/OK Computer/Karma Police.mp3", 7_654_321, Some(264.2));

        let breakdown = matcher.score(&track, &file);
        assert!(breakdown.score >= 90, "score was {}", breakdown.score);
        assert!(breakdown.artist_match);
        assert!(matcher.is_auto_replace_candidate(&breakdown));
    }

    #[test]
    fn test_size_tiers() {
        let matcher = TrackMatcher::new();
        let track = TrackDescriptor::new("zzzz").with_size(10_000);

        let exact = matcher.score(&track, &candidate("/a.wav", 10_000, None));
        assert_eq!(exact.contributions.get("exact_size"), Some(&15));

        let close = matcher.score(&track, &candidate("/a.wav", 10_500, None));
        assert_eq!(close.contributions.get("close_size"), Some(&5));

        let far = matcher.score(&track, &candidate("/a.wav", 20_000, None));
        assert!(far.contributions.is_empty());
    }

    #[test]
    fn test_duration_tiers() {
        let matcher = TrackMatcher::new();
        let track = TrackDescriptor::new("zzzz").with_duration(200.0);

        let cases = [
            (200.5, "exact_duration", 10),
            (202.5, "close_duration", 5),
            (209.0, "reasonable_duration", 2),
        ];
        for (actual, signal, points) in cases {
            let b = matcher.score(&track, &candidate("/a.wav", 1, Some(actual)));
            assert_eq!(b.contributions.get(signal), Some(&points), "{}", signal);
        }

        let far = matcher.score(&track, &candidate("/a.wav", 1, Some(260.0)));
        assert!(far.contributions.is_empty());
    }

    #[test]
    fn test_fuzzy_name() {
        let matcher = TrackMatcher::new();
        let track = TrackDescriptor::new("Yesterday").with_artist("The Beatles");
        let b = matcher.score(&track, &candidate("/m/The Beatles/Yesturday.wav", 1, None));
        assert!(b.track_match);
        let fuzzy = b.contributions.get("fuzzy_track_name").copied().unwrap();
        assert!(fuzzy > 12 && fuzzy < 20, "fuzzy was {}", fuzzy);
        assert!(!b.contributions.contains_key("exact_track_name"));
    }

    #[test]
    fn test_artist_signals_stack() {
        let matcher = TrackMatcher::new();
        let track = TrackDescriptor::new("zzzz").with_artist("Bjork");
        let b = matcher.score(&track, &candidate("/music/Björk/Homogenic/Björk - Joga.wav", 1, None));
        assert_eq!(b.contributions.get("artist_in_filename"), Some(&10));
        assert_eq!(b.contributions.get("artist_in_directory"), Some(&15));
        assert!(!b.contributions.contains_key("artist_in_parent_dir"));
        assert!(b.artist_match);

        let flat = matcher.score(&track, &candidate("/music/Björk/Joga.wav", 1, None));
        assert_eq!(flat.contributions.get("artist_in_parent_dir"), Some(&5));
    }

    #[test]
    fn test_album_parent_and_grandparent() {
        let matcher = TrackMatcher::new();
        let track = TrackDescriptor::new("zzzz").with_album("Kind of Blue");

        let parent = matcher.score(&track, &candidate("/m/Miles/Kind of Blue/So What.wav", 1, None));
        assert_eq!(parent.contributions.get("album_in_parent_dir"), Some(&10));

        let grandparent =
            matcher.score(&track, &candidate("/m/Kind of Blue/Disc 1/So What.wav", 1, None));
        assert_eq!(grandparent.contributions.get("album_in_grandparent_dir"), Some(&5));
        assert!(!grandparent.contributions.contains_key("album_in_parent_dir"));
    }

    #[test]
    fn test_track_number_start_preferred() {
        let matcher = TrackMatcher::new();
        let track = TrackDescriptor::new("zzzz").with_track_number(3);

        let start = matcher.score(&track, &candidate("/m/03 - Song.wav", 1, None));
        assert_eq!(start.contributions.get("track_number_start"), Some(&5));
        assert!(!start.contributions.contains_key("track_number_anywhere"));

        let anywhere = matcher.score(&track, &candidate("/m/Song 03.wav", 1, None));
        assert_eq!(anywhere.contributions.get("track_number_anywhere"), Some(&2));

        let longer = matcher.score(&track, &candidate("/m/30 Song.wav", 1, None));
        assert!(!longer.contributions.contains_key("track_number_start"));
    }

    #[test]
    fn test_starts_with_track_number() {
        assert!(starts_with_track_number("01 song", 1));
        assert!(starts_with_track_number("1 song", 1));
        assert!(starts_with_track_number("012 song", 12));
        assert!(!starts_with_track_number("12 song", 1));
        assert!(!starts_with_track_number("1", 1));
    }

    #[test]
    fn test_extension_and_year() {
        let matcher = TrackMatcher::new();
        let track = TrackDescriptor::new("zzzz").with_year(1997);
        let b = matcher.score(&track, &candidate("/m/1997 - OK/track.flac", 1, None));
        assert_eq!(b.contributions.get("proper_extension"), Some(&1));
        assert_eq!(b.contributions.get("year_match"), Some(&2));

        let wav = matcher.score(&track, &candidate("/m/track.wav", 1, None));
        assert!(wav.contributions.is_empty());
    }

    #[test]
    fn test_wrong_content_penalty() {
        let matcher = TrackMatcher::new();
        let track = TrackDescriptor::new("Morning Show").with_artist("Host");
        let b = matcher.score(&track, &candidate("/m/Host/Morning Show Podcast.mp3", 1, None));
        assert_eq!(b.penalties.get("wrong_content"), Some(&20));
    }

    #[test]
    fn test_short_name_without_artist_penalty() {
        let matcher = TrackMatcher::new();
        let track = TrackDescriptor::new("Home").with_artist("Someone");
        let b = matcher.score(&track, &candidate("/m/Various/Home.wav", 1, None));
        assert_eq!(b.penalties.get("short_name_no_artist"), Some(&10));
        assert_eq!(b.score, 50);

        let with_artist = matcher.score(&track, &candidate("/m/Someone/Home.wav", 1, None));
        assert!(!with_artist.penalties.contains_key("short_name_no_artist"));
    }

    #[test]
    fn test_known_mismatch_penalty() {
        let matcher = TrackMatcher::new();
        let track = TrackDescriptor::new("Life");
        let b = matcher.score(&track, &candidate("/m/Ghetto Life.wav", 1, None));
        assert_eq!(b.penalties.get("known_mismatch"), Some(&5));
    }

    #[test]
    fn test_rank_sorts_descending() {
        let matcher = TrackMatcher::new();
        let track = TrackDescriptor::new("Teardrop").with_artist("Massive Attack");
        let ranked = matcher.rank(
            &track,
            &[
                candidate("/m/Other/Teardrops Cover.wav", 1, None),
                candidate("/m/Massive Attack/Teardrop.mp3", 1, None),
            ],
        );
        assert_eq!(ranked[0].candidate.path, PathBuf::from("/m/Massive Attack/Teardrop.mp3"));
        assert!(ranked[0].score() >= ranked[1].score());
    }

    #[test]
    fn test_best_match_thresholds() {
        let matcher = TrackMatcher::new();
        let track = TrackDescriptor::new("Completely Different");
        assert!(matcher
            .best_match(&track, &[candidate("/m/zz.wav", 1, None)])
            .is_none());

        let hit = matcher
            .best_match(&track, &[candidate("/m/Completely Different.wav", 1, None)])
            .unwrap();
        assert!(hit.score() >= 15);
        assert!(matcher.best_match(&track, &[]).is_none());
    }
}
