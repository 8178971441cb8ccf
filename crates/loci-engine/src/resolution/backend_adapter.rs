//! Backend adapter for selector verification.
//!
//! Implements `SelectorQuery` on top of any `Backend`, so the verifier stays
//! backend-agnostic.

use async_trait::async_trait;
use loci_common::error::BackendError;

use crate::backend::Backend;
use crate::selectors::{SelectorError, SelectorQuery};

pub struct BackendSelectorQuery<'a, B: Backend + ?Sized> {
    backend: &'a mut B,
}

impl<'a, B: Backend + ?Sized> BackendSelectorQuery<'a, B> {
    pub fn new(backend: &'a mut B) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl<'a, B: Backend + ?Sized> SelectorQuery for BackendSelectorQuery<'a, B> {
    async fn query_count(&mut self, selector: &str) -> Result<usize, SelectorError> {
        self.backend
            .query_count(selector)
            .await
            .map_err(|e| match e {
                BackendError::SelectorInvalid { selector } => {
                    SelectorError::InvalidSelector(selector)
                }
                other => SelectorError::Backend(other.to_string()),
            })
    }
}
