//! Assembly of per-key resolution entries.

use crate::discovery::confidence_from_primary;
use crate::features::summarize;
use crate::scoring::{ScoreResult, round_to};
use crate::selectors::{derive_status, fallbacks, select_primary};
use loci_common::bundle::{CandidateSelector, ResolutionEntry, ResolutionStatus};
use loci_common::snapshot::ElementSnapshot;

/// Entry for a targeted resolution whose element was found.
pub fn target_entry(
    el: &ElementSnapshot,
    score: &ScoreResult,
    candidates: Vec<CandidateSelector>,
) -> ResolutionEntry {
    let primary = select_primary(&candidates).cloned();
    let status = derive_status(primary.as_ref(), &candidates);
    let fallbacks = fallbacks(&candidates, primary.as_ref());

    ResolutionEntry {
        status,
        message: None,
        target: None,
        confidence: round_to(score.combined_score, 2),
        heuristic: Some(score.breakdown()),
        embedding_similarity: Some(round_to(score.embedding_similarity, 3)),
        node: Some(summarize(el)),
        primary,
        candidates,
        fallbacks,
    }
}

/// Entry for a discovered element, or `None` when no candidate is unique.
pub fn discovery_entry(
    el: &ElementSnapshot,
    candidates: Vec<CandidateSelector>,
) -> Option<ResolutionEntry> {
    let primary = select_primary(&candidates)?.clone();
    let fallbacks = fallbacks(&candidates, Some(&primary));

    Some(ResolutionEntry {
        status: ResolutionStatus::Resolved,
        message: None,
        target: None,
        confidence: round_to(confidence_from_primary(&primary), 2),
        heuristic: None,
        embedding_similarity: None,
        node: Some(summarize(el)),
        primary: Some(primary),
        candidates,
        fallbacks,
    })
}
