//! Primary selector choice and entry status.

use loci_common::bundle::{CandidateSelector, ResolutionStatus};

/// First unique candidate in synthesis order.
pub fn select_primary(candidates: &[CandidateSelector]) -> Option<&CandidateSelector> {
    candidates.iter().find(|c| c.is_unique())
}

/// Unique candidates other than the primary, in synthesis order.
pub fn fallbacks(
    candidates: &[CandidateSelector],
    primary: Option<&CandidateSelector>,
) -> Vec<CandidateSelector> {
    let Some(primary) = primary else {
        return vec![];
    };
    candidates
        .iter()
        .filter(|c| c.is_unique() && c.selector != primary.selector)
        .cloned()
        .collect()
}

pub fn derive_status(
    primary: Option<&CandidateSelector>,
    candidates: &[CandidateSelector],
) -> ResolutionStatus {
    if primary.is_some() {
        ResolutionStatus::Resolved
    } else if !candidates.is_empty() {
        ResolutionStatus::NeedsReview
    } else {
        ResolutionStatus::Unresolved
    }
}
