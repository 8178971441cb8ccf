use super::provider::{EmbeddingError, EmbeddingProvider, cosine, create_provider};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tracing::{info, warn};

/// Encodings kept per oracle.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

type ProviderSlot = Result<Box<dyn EmbeddingProvider>, EmbeddingError>;

/// Cached `similarity(a, b)` over an embedding provider.
///
/// The provider is instantiated on first use and lives as long as the oracle;
/// one oracle serves one resolution run. Encodings are memoized by exact text.
pub struct SimilarityOracle {
    model_name: String,
    provider: OnceLock<ProviderSlot>,
    cache: Mutex<LruCache<String, Arc<Vec<f32>>>>,
}

impl SimilarityOracle {
    pub fn new(model_name: impl Into<String>, capacity: usize) -> Self {
        Self {
            model_name: model_name.into(),
            provider: OnceLock::new(),
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    /// Oracle over an already constructed provider.
    pub fn with_provider(provider: Box<dyn EmbeddingProvider>, capacity: usize) -> Self {
        let oracle = Self::new(provider.model_name().to_string(), capacity);
        let _ = oracle.provider.set(Ok(provider));
        oracle
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn provider(&self) -> Result<&dyn EmbeddingProvider, EmbeddingError> {
        let slot = self.provider.get_or_init(|| {
            info!("Loading embedding model {}", self.model_name);
            let created = create_provider(&self.model_name);
            if let Err(e) = &created {
                warn!("Embedding model unavailable, scoring is heuristic-only: {}", e);
            }
            created
        });
        match slot {
            Ok(provider) => Ok(provider.as_ref()),
            Err(e) => Err(e.clone()),
        }
    }

    /// Whether the provider could be instantiated. Forces lazy loading.
    pub fn is_available(&self) -> bool {
        self.provider().is_ok()
    }

    fn cache(&self) -> MutexGuard<'_, LruCache<String, Arc<Vec<f32>>>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn encode(&self, text: &str) -> Result<Arc<Vec<f32>>, EmbeddingError> {
        if let Some(hit) = self.cache().get(text) {
            return Ok(Arc::clone(hit));
        }
        let vector = Arc::new(self.provider()?.embed(text)?);
        self.cache().put(text.to_string(), Arc::clone(&vector));
        Ok(vector)
    }

    /// Cosine similarity in [-1, 1].
    pub fn similarity(&self, a: &str, b: &str) -> Result<f32, EmbeddingError> {
        let ea = self.encode(a)?;
        let eb = self.encode(b)?;
        cosine(&ea, &eb)
    }

    pub fn cached_len(&self) -> usize {
        self.cache().len()
    }
}

impl std::fmt::Debug for SimilarityOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityOracle")
            .field("model_name", &self.model_name)
            .field("loaded", &self.provider.get().is_some())
            .field("cached", &self.cached_len())
            .finish()
    }
}
