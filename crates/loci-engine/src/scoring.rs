//! Hybrid heuristic + embedding scoring of elements against semantic targets.

use crate::features::PreparedElement;
use crate::similarity::SimilarityOracle;
use loci_common::bundle::HeuristicBreakdown;
use loci_common::target::SemanticTarget;
use tracing::debug;

const TAG_POINTS: u32 = 3;
const TYPE_POINTS: u32 = 3;
const HINT_POINTS: u32 = 2;

const HEURISTIC_WEIGHT: f64 = 0.6;
const EMBEDDING_WEIGHT: f64 = 0.4;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub heuristic_score: u32,
    /// Heuristic ceiling, never below 1.
    pub heuristic_max: u32,
    pub matched_hints: Vec<String>,
    /// Embedding similarity remapped to [0, 1].
    pub embedding_similarity: f64,
    /// `0.6 * heuristic/ceiling + 0.4 * embedding`, rounded to 4 places.
    pub combined_score: f64,
}

impl ScoreResult {
    pub fn heuristic_normalized(&self) -> f64 {
        f64::from(self.heuristic_score) / f64::from(self.heuristic_max.max(1))
    }

    pub fn breakdown(&self) -> HeuristicBreakdown {
        HeuristicBreakdown {
            score: self.heuristic_score,
            max: self.heuristic_max,
            matched_hints: self.matched_hints.clone(),
        }
    }
}

/// Round to `places` decimals from the exact binary value.
///
/// `0.075` is stored just below the midpoint, so it rounds to `0.07`.
pub fn round_to(value: f64, places: usize) -> f64 {
    format!("{:.*}", places, value).parse().unwrap_or(value)
}

/// Prompt describing a target to the similarity oracle.
pub fn target_prompt(target: &SemanticTarget) -> String {
    format!("{} element with hints: {}", target.key, target.hints.join("; "))
}

/// Score one element against one target.
///
/// Without an oracle the embedding term is 0.0 and the score is
/// heuristic-only.
pub fn score(
    el: &PreparedElement,
    target: &SemanticTarget,
    oracle: Option<&SimilarityOracle>,
) -> ScoreResult {
    let snapshot = el.snapshot();
    let blob = el.text_blob();

    let mut points = 0;
    let mut ceiling = 0;

    if let Some(tag) = target.expected_tag() {
        ceiling += TAG_POINTS;
        if snapshot.tag == tag {
            points += TAG_POINTS;
        }
    }
    if !target.types.is_empty() {
        ceiling += TYPE_POINTS;
        if snapshot
            .input_type
            .as_ref()
            .is_some_and(|t| target.types.contains(t))
        {
            points += TYPE_POINTS;
        }
    }

    // Required hints gate the whole score. The reported ceiling still includes
    // every hint so the theoretical maximum stays visible.
    let gated = target
        .required_hints
        .iter()
        .any(|hint| !blob.contains(&hint.to_lowercase()));
    if gated {
        ceiling += HINT_POINTS * target.hints.len() as u32;
        return ScoreResult {
            heuristic_score: 0,
            heuristic_max: ceiling.max(1),
            matched_hints: vec![],
            embedding_similarity: 0.0,
            combined_score: 0.0,
        };
    }

    let mut matched_hints = Vec::new();
    for hint in target.hints.iter().map(|h| h.to_lowercase()) {
        ceiling += HINT_POINTS;
        if blob.contains(&hint) {
            points += HINT_POINTS;
            matched_hints.push(hint);
        }
    }

    let heuristic_norm = f64::from(points) / f64::from(ceiling.max(1));

    let embedding_similarity = match oracle {
        Some(oracle) => match oracle.similarity(&target_prompt(target), el.description()) {
            Ok(sim) => ((f64::from(sim) + 1.0) / 2.0).clamp(0.0, 1.0),
            Err(e) => {
                debug!("Similarity unavailable for {}: {}", target.key, e);
                0.0
            }
        },
        None => 0.0,
    };

    let combined = round_to(
        heuristic_norm * HEURISTIC_WEIGHT + embedding_similarity * EMBEDDING_WEIGHT,
        4,
    );

    ScoreResult {
        heuristic_score: points,
        heuristic_max: ceiling.max(1),
        matched_hints,
        embedding_similarity,
        combined_score: combined,
    }
}

/// Highest-scoring element for a target.
///
/// Elements scoring zero are ignored; ties go to the element seen first.
pub fn pick_best<'a>(
    elements: &'a [PreparedElement],
    target: &SemanticTarget,
    oracle: Option<&SimilarityOracle>,
) -> Option<(&'a PreparedElement, ScoreResult)> {
    let mut best: Option<(&PreparedElement, ScoreResult)> = None;
    for el in elements {
        let result = score(el, target, oracle);
        if result.combined_score <= 0.0 {
            continue;
        }
        let better = best
            .as_ref()
            .is_none_or(|(_, current)| result.combined_score > current.combined_score);
        if better {
            best = Some((el, result));
        }
    }

    if let Some((el, result)) = &best {
        debug!(
            "Target {} -> element #{} (combined {:.4})",
            target.key,
            el.index(),
            result.combined_score
        );
    }
    best
}
