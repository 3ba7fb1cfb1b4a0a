//! Candidate scoring and acceptance.
//!
//! [`TrackMatcher`] turns a wanted [`TrackDescriptor`] and a set of
//! [`CandidateFile`](crate::index::CandidateFile)s into a ranked list of
//! [`ScoredCandidate`]s, then [`TrackMatcher::decide`] either auto-accepts
//! one or hands the ranking back for a human decision.

mod config;
mod decision;
mod scorer;
mod types;

pub use config::{
    KnownMismatch, MatcherConfig, ScorePenalties, ScoreWeights, DEFAULT_AUTO_ACCEPT_THRESHOLD,
};
pub use decision::decide_ranked;
pub use scorer::TrackMatcher;
pub use types::{AcceptReason, Decision, ScoreBreakdown, ScoredCandidate, TrackDescriptor};
