use super::hashing::HashingEmbedder;
use thiserror::Error;

/// Model used when no other is configured.
pub const DEFAULT_MODEL: &str = "hashing-ngram-384";

#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    #[error("Unknown embedding model: {0}")]
    UnknownModel(String),

    #[error("Embedding dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
}

/// Turns text into a fixed-length, L2-normalized vector.
pub trait EmbeddingProvider: Send + Sync {
    fn model_name(&self) -> &str;

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Instantiate a built-in provider by model name.
///
/// Recognised names are `hashing-ngram` and `hashing-ngram-<dims>`.
pub fn create_provider(model_name: &str) -> Result<Box<dyn EmbeddingProvider>, EmbeddingError> {
    let Some(rest) = model_name.strip_prefix(HashingEmbedder::MODEL_PREFIX) else {
        return Err(EmbeddingError::UnknownModel(model_name.to_string()));
    };

    let dims = match rest {
        "" => HashingEmbedder::DEFAULT_DIMS,
        suffix => suffix
            .strip_prefix('-')
            .and_then(|d| d.parse::<usize>().ok())
            .filter(|d| *d > 0)
            .ok_or_else(|| EmbeddingError::UnknownModel(model_name.to_string()))?,
    };

    Ok(Box::new(HashingEmbedder::new(dims)))
}

/// Cosine similarity of two normalized vectors (their dot product).
pub fn cosine(a: &[f32], b: &[f32]) -> Result<f32, EmbeddingError> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_hashing_models_by_name() {
        assert_eq!(create_provider("hashing-ngram").unwrap().model_name(), "hashing-ngram-384");
        assert_eq!(create_provider("hashing-ngram-64").unwrap().model_name(), "hashing-ngram-64");
        assert_eq!(create_provider(DEFAULT_MODEL).unwrap().model_name(), DEFAULT_MODEL);
    }

    #[test]
    fn rejects_unknown_models() {
        assert!(matches!(
            create_provider("sentence-transformers/all-MiniLM-L6-v2"),
            Err(EmbeddingError::UnknownModel(_))
        ));
        assert!(create_provider("hashing-ngram-0").is_err());
        assert!(create_provider("hashing-ngramx").is_err());
    }

    #[test]
    fn cosine_requires_matching_dimensions() {
        assert!(cosine(&[1.0, 0.0], &[1.0]).is_err());
        assert!((cosine(&[0.6, 0.8], &[0.6, 0.8]).unwrap() - 1.0).abs() < 1e-6);
    }
}
