//! Character-trigram embedding provider.
//!
//! A deterministic, offline embedding function: words are hashed into the
//! vector through their character trigrams and their whole-word hash,
//! weighted by frequency, and the result is unit-normalized. The same text
//! always yields the same vector, which is the invariant the persisted
//! index depends on.

use std::collections::{HashMap, HashSet};

use crate::embeddings::provider::EmbeddingProvider;
use artex_core::AppResult;

/// Common words that carry little signal for retrieval.
const STOP_WORDS: [&str; 32] = [
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them",
];

/// Deterministic local embedding provider.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
}

impl TrigramProvider {
    /// Create a provider producing vectors of the given dimension.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];

        let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();
        let lower = text.to_lowercase();

        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split_whitespace()
            .filter(|w| w.len() > 2 && !stop_words.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            // Spread each word over several dimensions via its trigrams
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                let dim = hash_bytes(trigram.as_bytes(), 37) % self.dimensions;
                embedding[dim] += (*freq as f32).sqrt();
            }

            // And anchor the whole word in one dimension
            let dim = hash_bytes(word.as_bytes(), 31) % self.dimensions;
            embedding[dim] += *freq as f32;
        }

        normalize(&mut embedding);
        embedding
    }
}

fn hash_bytes(bytes: &[u8], multiplier: u64) -> usize {
    bytes
        .iter()
        .fold(0u64, |acc, b| acc.wrapping_mul(multiplier).wrapping_add(*b as u64)) as usize
}

fn normalize(embedding: &mut [f32]) {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in embedding.iter_mut() {
            *v /= norm;
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deterministic() {
        let provider = TrigramProvider::new(384);
        let text = "markets rallied after the announcement";

        let first = provider.embed(text).await.unwrap();
        let second = provider.embed(text).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unit_normalized() {
        let provider = TrigramProvider::new(384);
        let embedding = provider
            .embed("central bank raises interest rates again")
            .await
            .unwrap();

        assert_eq!(embedding.len(), 384);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_different_texts_differ() {
        let provider = TrigramProvider::new(384);

        let a = provider.embed("quarterly earnings beat estimates").await.unwrap();
        let b = provider.embed("storm warnings issued for the coast").await.unwrap();

        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_similar_texts_are_closer_than_unrelated() {
        let provider = TrigramProvider::new(384);

        let base = provider.embed("electric vehicle sales grew").await.unwrap();
        let near = provider.embed("electric vehicle sales slowed").await.unwrap();
        let far = provider.embed("rainfall totals broke records").await.unwrap();

        let dot = |x: &[f32], y: &[f32]| -> f32 { x.iter().zip(y).map(|(a, b)| a * b).sum() };
        assert!(dot(&base, &near) > dot(&base, &far));
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let provider = TrigramProvider::new(384);
        let embedding = provider.embed("").await.unwrap();

        assert_eq!(embedding.len(), 384);
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_batch_embeds_every_text() {
        let provider = TrigramProvider::new(64);
        let texts = vec![
            "first article chunk".to_string(),
            "second article chunk".to_string(),
        ];

        let embeddings = provider.embed_batch(&texts).await.unwrap();
        assert_eq!(embeddings.len(), 2);
        for embedding in &embeddings {
            assert_eq!(embedding.len(), 64);
        }
    }

    #[tokio::test]
    async fn test_utf8_safety() {
        let provider = TrigramProvider::new(384);
        let embedding = provider
            .embed("Ο πληθωρισμός υποχώρησε τον Ιούλιο 📉")
            .await
            .unwrap();
        assert_eq!(embedding.len(), 384);
    }
}
