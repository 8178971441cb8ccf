//! Resolution orchestration.
//!
//! Targeted mode ranks captured elements per target, then synthesizes,
//! verifies and picks selectors for the winner. Discovery mode runs selector
//! synthesis and verification for every captured element and labels the ones
//! that end up with a unique selector.

use super::BackendSelectorQuery;
use super::entry::{discovery_entry, target_entry};
use crate::backend::{Backend, BackendError};
use crate::discovery::KeyAllocator;
use crate::features::PreparedElement;
use crate::scoring::pick_best;
use crate::selectors::{SelectorQuery, build_candidates, verify_candidates};
use crate::similarity::SimilarityOracle;
use loci_common::bundle::{ResolutionBundle, ResolutionEntry, ResolutionMap};
use loci_common::target::SemanticTarget;
use tracing::{debug, info, warn};

pub struct ResolutionEngine;

impl ResolutionEngine {
    /// Capture the current page and wrap each element for scoring.
    pub async fn capture<B: Backend + ?Sized>(
        backend: &mut B,
    ) -> Result<Vec<PreparedElement>, BackendError> {
        let snapshots = backend.capture_elements().await?;
        info!("Captured {} interactive element(s)", snapshots.len());
        Ok(PreparedElement::prepare_all(snapshots))
    }

    /// Navigate to `url` and resolve every target against the live page.
    ///
    /// Only navigation or capture failures are errors; per-target problems are
    /// reported in the bundle.
    pub async fn resolve<B: Backend + ?Sized>(
        backend: &mut B,
        url: &str,
        targets: &[SemanticTarget],
        oracle: Option<&SimilarityOracle>,
    ) -> Result<ResolutionBundle, BackendError> {
        let nav = backend.navigate(url).await?;
        info!("Loaded {} ({})", nav.url, nav.title);

        let elements = Self::capture(backend).await?;
        let mut query = BackendSelectorQuery::new(backend);
        Ok(Self::resolve_targets(&mut query, url, &elements, targets, oracle).await)
    }

    /// Resolve targets, in order, against already captured elements.
    pub async fn resolve_targets<Q: SelectorQuery + ?Sized>(
        query: &mut Q,
        url: &str,
        elements: &[PreparedElement],
        targets: &[SemanticTarget],
        oracle: Option<&SimilarityOracle>,
    ) -> ResolutionBundle {
        let mut resolution = ResolutionMap::new();

        for target in targets {
            let entry = Self::resolve_target(query, elements, target, oracle).await;
            info!(
                "{}: {} (confidence {:.2})",
                target.key,
                entry.status.as_str(),
                entry.confidence
            );
            resolution.insert(target.key.clone(), entry);
        }

        ResolutionBundle {
            url: url.to_string(),
            semantic_targets: targets.iter().map(|t| t.key.clone()).collect(),
            resolution,
        }
    }

    async fn resolve_target<Q: SelectorQuery + ?Sized>(
        query: &mut Q,
        elements: &[PreparedElement],
        target: &SemanticTarget,
        oracle: Option<&SimilarityOracle>,
    ) -> ResolutionEntry {
        let Some((el, score)) = pick_best(elements, target, oracle) else {
            return ResolutionEntry::unmatched(target);
        };

        let mut candidates = build_candidates(el.snapshot());
        verify_candidates(query, &mut candidates).await;
        target_entry(el.snapshot(), &score, candidates)
    }

    /// Navigate to `url` and label every interactive element on it.
    pub async fn discover<B: Backend + ?Sized>(
        backend: &mut B,
        url: &str,
    ) -> Result<ResolutionBundle, BackendError> {
        let nav = backend.navigate(url).await?;
        info!("Loaded {} ({})", nav.url, nav.title);

        let elements = Self::capture(backend).await?;
        let mut query = BackendSelectorQuery::new(backend);
        Ok(Self::discover_elements(&mut query, url, &elements).await)
    }

    /// Discovery over captured elements, in capture order.
    ///
    /// Elements without a unique selector are left out of the bundle.
    pub async fn discover_elements<Q: SelectorQuery + ?Sized>(
        query: &mut Q,
        url: &str,
        elements: &[PreparedElement],
    ) -> ResolutionBundle {
        let mut keys = KeyAllocator::new();
        let mut resolution = ResolutionMap::new();

        for el in elements {
            let mut candidates = build_candidates(el.snapshot());
            verify_candidates(query, &mut candidates).await;

            let Some(entry) = discovery_entry(el.snapshot(), candidates) else {
                debug!("Element #{} has no unique selector, skipping", el.index());
                continue;
            };
            let key = keys.assign(el.snapshot(), el.index());
            if resolution.get(&key).is_some() {
                warn!(
                    "Key {} already assigned, element #{} replaces the earlier entry",
                    key,
                    el.index()
                );
            }
            debug!("Element #{} labelled {}", el.index(), key);
            resolution.insert(key, entry);
        }

        info!(
            "Discovered {} of {} element(s)",
            resolution.len(),
            elements.len()
        );

        ResolutionBundle {
            url: url.to_string(),
            semantic_targets: resolution.keys().map(str::to_string).collect(),
            resolution,
        }
    }
}
