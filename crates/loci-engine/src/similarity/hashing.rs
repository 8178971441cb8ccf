//! Feature-hashed n-gram embeddings.
//!
//! A deterministic, dependency-free stand-in for a neural sentence encoder:
//! word-boundary padded character trigrams and whole words are hashed into a
//! fixed number of buckets with a sign bit, then L2-normalized.

use super::provider::{EmbeddingError, EmbeddingProvider};

const FNV_OFFSET: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// Whole words weigh more than individual trigrams.
const WORD_WEIGHT: f32 = 2.0;

pub struct HashingEmbedder {
    dims: usize,
    name: String,
}

impl HashingEmbedder {
    pub const MODEL_PREFIX: &'static str = "hashing-ngram";
    pub const DEFAULT_DIMS: usize = 384;

    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            name: format!("{}-{}", Self::MODEL_PREFIX, dims),
        }
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let hash = fnv1a(feature.as_bytes());
        let bucket = (hash % self.dims as u64) as usize;
        let sign = if (hash >> 63) & 1 == 1 { -1.0 } else { 1.0 };
        vector[bucket] += sign * weight;
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIMS)
    }
}

impl EmbeddingProvider for HashingEmbedder {
    fn model_name(&self) -> &str {
        &self.name
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0f32; self.dims];
        let lowered = text.to_lowercase();

        for word in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            self.add_feature(&mut vector, word, WORD_WEIGHT);

            let padded: Vec<char> = std::iter::once('^')
                .chain(word.chars())
                .chain(std::iter::once('$'))
                .collect();
            for window in padded.windows(3) {
                let gram: String = window.iter().collect();
                self.add_feature(&mut vector, &gram, 1.0);
            }
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::provider::cosine;

    #[test]
    fn embeddings_are_normalized_and_deterministic() {
        let embedder = HashingEmbedder::new(128);
        let a = embedder.embed("Sign in to your account").unwrap();
        let b = embedder.embed("Sign in to your account").unwrap();
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn related_text_is_closer_than_unrelated_text() {
        let embedder = HashingEmbedder::default();
        let prompt = embedder
            .embed("login.password element with hints: password; sign in")
            .unwrap();
        let password = embedder
            .embed("tag=input ; type=password ; placeholder=Password")
            .unwrap();
        let newsletter = embedder
            .embed("tag=input ; type=checkbox ; labels=Subscribe to newsletter")
            .unwrap();
        assert!(cosine(&prompt, &password).unwrap() > cosine(&prompt, &newsletter).unwrap());
    }

    #[test]
    fn empty_text_embeds_to_zero_vector() {
        let embedder = HashingEmbedder::new(16);
        let v = embedder.embed("  ;; ").unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }
}
