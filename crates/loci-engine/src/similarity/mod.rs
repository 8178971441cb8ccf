//! Text similarity backed by a pluggable embedding provider.

pub mod hashing;
pub mod oracle;
pub mod provider;

pub use hashing::HashingEmbedder;
pub use oracle::{DEFAULT_CACHE_CAPACITY, SimilarityOracle};
pub use provider::{DEFAULT_MODEL, EmbeddingError, EmbeddingProvider, cosine, create_provider};
