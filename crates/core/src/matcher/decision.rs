use tracing::debug;

use super::types::{AcceptReason, Decision, ScoredCandidate};

/// Decides on an already ranked (descending) candidate list.
///
/// - The top candidate is accepted when it reaches `auto_accept_threshold`.
///   When several candidates share that top score, the first whose file
///   stem contains no `1` wins (avoids "track 1" / "copy 1" duplicates),
///   falling back to the first tied candidate.
/// - Otherwise, a lone candidate scoring above `single_candidate_threshold`
///   is accepted.
/// - Anything else needs review.
pub fn decide_ranked(
    ranked: Vec<ScoredCandidate>,
    auto_accept_threshold: u8,
    single_candidate_threshold: u8,
) -> Decision {
    let Some(top_score) = ranked.first().map(ScoredCandidate::score) else {
        return Decision::NoCandidates;
    };

    if top_score >= auto_accept_threshold {
        let tied = ranked.iter().take_while(|c| c.score() == top_score).count();
        if tied == 1 {
            return accept(ranked, 0, AcceptReason::TopScore);
        }

        let index = ranked[..tied]
            .iter()
            .position(|c| !c.candidate.stem().contains('1'))
            .unwrap_or(0);
        debug!("{} candidates tied at {}, picked #{}", tied, top_score, index);
        return accept(ranked, index, AcceptReason::TieBreak);
    }

    if ranked.len() == 1 && top_score > single_candidate_threshold {
        return accept(ranked, 0, AcceptReason::SingleCandidate);
    }

    Decision::NeedsReview { ranked }
}

fn accept(mut ranked: Vec<ScoredCandidate>, index: usize, reason: AcceptReason) -> Decision {
    Decision::AutoAccept {
        candidate: ranked.swap_remove(index),
        reason,
    }
}
