//! Article knowledge pipeline.
//!
//! URLs → documents → chunks → embeddings → persisted index, and the RAG
//! query flow over that index.

pub mod chunker;
pub mod embeddings;
pub mod index;
pub mod loader;
pub mod rag;
pub mod types;

// Re-export commonly used types
pub use rag::{RagResponse, SourceRef};
pub use types::{BuildStats, Chunk, Document, IndexStats};

use std::time::Instant;

use artex_core::{AppConfig, AppError, AppResult};

/// Fetch the URLs and build a fresh persisted index over their text.
///
/// Replaces any previously persisted index; it never merges. A failure at
/// any stage leaves the previous index untouched.
pub async fn build(config: &AppConfig, urls: &[String]) -> AppResult<BuildStats> {
    let start = Instant::now();

    tracing::info!("Processing {} URL(s)", urls.len());

    let client = reqwest::Client::new();
    let documents = loader::load_urls(&client, urls).await?;

    let bytes_processed: u64 = documents.iter().map(|d| d.text.len() as u64).sum();
    let sources_count = documents.len() as u32;

    let mut chunks = Vec::new();
    for document in &documents {
        let pieces = chunker::chunk_text(&document.text, config.chunk_size, config.chunk_overlap);
        for (position, text) in pieces.into_iter().enumerate() {
            chunks.push(Chunk::new(
                document.source_url.clone(),
                position as u32,
                text,
            ));
        }
    }

    if chunks.is_empty() {
        return Err(AppError::NoContent(
            "No text content could be extracted from the URLs".to_string(),
        ));
    }

    tracing::info!(
        "Embedding {} chunks from {} document(s)",
        chunks.len(),
        sources_count
    );

    let provider = embeddings::default_provider();
    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = provider.embed_batch(&texts).await?;
    for (chunk, vector) in chunks.iter_mut().zip(vectors) {
        chunk.embedding = Some(vector);
    }

    let meta = index::IndexMeta {
        embedder: embeddings::EMBEDDER_NAME.to_string(),
        dimensions: provider.dimensions(),
        chunk_size: config.chunk_size,
        chunk_overlap: config.chunk_overlap,
        sources_count,
    };

    config.ensure_data_dir()?;
    index::build_index(&config.index_path(), &chunks, &meta)?;

    let duration = start.elapsed();
    let chunks_count = chunks.len() as u32;

    tracing::info!(
        "Indexed {} chunks from {} source(s) ({} bytes) in {:.2}s",
        chunks_count,
        sources_count,
        bytes_processed,
        duration.as_secs_f64()
    );

    Ok(BuildStats {
        sources_count,
        chunks_count,
        bytes_processed,
        duration_secs: duration.as_secs_f64(),
    })
}

/// Report the state of the persisted index.
pub fn stats(config: &AppConfig) -> AppResult<IndexStats> {
    let index_path = config.index_path();
    if !index_path.exists() {
        return Err(AppError::IndexMissing);
    }

    let conn = index::open_index(&index_path)?;
    index::get_stats(&conn, &index_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> AppConfig {
        let mut config = AppConfig::default();
        config.data_dir = dir.path().join("data");
        config
    }

    fn article(paragraphs: usize) -> String {
        let body: String = (0..paragraphs)
            .map(|i| format!("<p>Paragraph {} covers the quarterly results in detail.</p>", i))
            .collect();
        format!("<html><body><h1>Quarterly results</h1>{}</body></html>", body)
    }

    #[tokio::test]
    async fn test_build_persists_index() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/article");
            then.status(200).body(article(6));
        });

        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let stats = build(&config, &[server.url("/article")]).await.unwrap();

        assert_eq!(stats.sources_count, 1);
        assert!(stats.chunks_count > 1);
        assert!(config.index_path().exists());
    }

    #[tokio::test]
    async fn test_failed_build_keeps_previous_index() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/article");
            then.status(200).body(article(3));
        });
        server.mock(|when, then| {
            when.method(GET).path("/gone");
            then.status(404);
        });

        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        build(&config, &[server.url("/article")]).await.unwrap();
        let before = stats(&config).unwrap();

        let result = build(&config, &[server.url("/gone")]).await;
        assert!(matches!(result, Err(AppError::NoContent(_))));

        let after = stats(&config).unwrap();
        assert_eq!(before.chunks_count, after.chunks_count);
        assert_eq!(before.built_at, after.built_at);
    }

    #[tokio::test]
    async fn test_rebuild_replaces_previous_index() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/one");
            then.status(200).body(article(2));
        });
        server.mock(|when, then| {
            when.method(GET).path("/two");
            then.status(200).body(article(8));
        });

        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        build(&config, &[server.url("/one")]).await.unwrap();
        let first = stats(&config).unwrap();

        build(&config, &[server.url("/two")]).await.unwrap();
        let second = stats(&config).unwrap();

        // Replaced, not merged: counts reflect only the second run
        assert_eq!(second.sources_count, 1);
        assert!(second.chunks_count > first.chunks_count);
    }

    #[tokio::test]
    async fn test_stats_before_build_is_index_missing() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        assert!(matches!(stats(&config), Err(AppError::IndexMissing)));
    }
}
