//! Embedding generation for chunks and questions.
//!
//! The index and every query must use the same embedding function; this
//! module pins that function: a deterministic, fully local provider with a
//! fixed dimension. No network is involved in embedding.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};

use std::sync::Arc;

/// Dimension of the fixed local embedding function.
pub const DIMENSIONS: usize = 384;

/// Name of the embedding function recorded in index metadata.
pub const EMBEDDER_NAME: &str = "trigram-v1";

/// The provider both the index builder and the query engine use.
pub fn default_provider() -> Arc<dyn EmbeddingProvider> {
    Arc::new(providers::trigram::TrigramProvider::new(DIMENSIONS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_provider_matches_recorded_metadata() {
        let provider = default_provider();
        assert_eq!(provider.model_name(), EMBEDDER_NAME);
        assert_eq!(provider.dimensions(), DIMENSIONS);

        let embedding = provider.embed("the same function at build and query time").await.unwrap();
        assert_eq!(embedding.len(), DIMENSIONS);
    }
}
