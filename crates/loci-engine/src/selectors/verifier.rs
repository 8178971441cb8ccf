//! Live uniqueness verification.
//!
//! Counting matches for a selector expression is the only page-dependent step
//! of selector resolution; everything else works on captured data.

use async_trait::async_trait;
use loci_common::bundle::CandidateSelector;
use thiserror::Error;
use tracing::{debug, warn};

/// Count live matches for selector expressions.
///
/// Implementations:
/// - Native backends: `BackendSelectorQuery` over `Backend::execute_scanner()`
/// - Tests: in-memory mocks
#[async_trait]
pub trait SelectorQuery: Send {
    /// Number of elements in the live document matching `selector`.
    async fn query_count(&mut self, selector: &str) -> Result<usize, SelectorError>;
}

#[derive(Debug, Clone, Error)]
pub enum SelectorError {
    /// Backend execution error (network, timeout, etc.)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Malformed or unsupported selector expression
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),
}

/// Annotate every candidate with its live match count, in order.
///
/// A failed query marks that candidate non-unique with the failure message and
/// never aborts the pass.
pub async fn verify_candidates<Q: SelectorQuery + ?Sized>(
    query: &mut Q,
    candidates: &mut [CandidateSelector],
) {
    for candidate in candidates.iter_mut() {
        match query.query_count(&candidate.selector).await {
            Ok(count) => {
                debug!("{} -> {} match(es)", candidate.selector, count);
                candidate.record_count(count);
            }
            Err(e) => {
                warn!("Selector query failed for {}: {}", candidate.selector, e);
                candidate.record_error(e.to_string());
            }
        }
    }
}
