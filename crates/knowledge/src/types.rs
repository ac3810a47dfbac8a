//! Knowledge pipeline type definitions.

use serde::{Deserialize, Serialize};

/// A source article fetched from a URL.
///
/// Immutable once created; the loader produces one per URL that yielded
/// extractable text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Extracted visible text
    pub text: String,

    /// URL the text came from
    pub source_url: String,
}

impl Document {
    pub fn new(text: String, source_url: String) -> Self {
        Self { text, source_url }
    }
}

/// A bounded-length piece of a document, the unit of embedding and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk identifier
    pub id: String,

    /// URL of the parent document
    pub source_url: String,

    /// Position within the parent document (ordering preserved)
    pub position: u32,

    /// Text content, at most the configured chunk size in characters
    pub text: String,

    /// Embedding vector (unit-normalized); populated by the index builder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    pub fn new(source_url: String, position: u32, text: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_url,
            position,
            text,
            embedding: None,
        }
    }
}

/// Statistics from one index build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildStats {
    /// Number of documents that yielded text
    pub sources_count: u32,

    /// Number of chunks embedded and persisted
    pub chunks_count: u32,

    /// Total extracted bytes processed
    pub bytes_processed: u64,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Current state of the persisted index, for `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of distinct source URLs in the index
    pub sources_count: u32,

    /// Number of chunks in the index
    pub chunks_count: u32,

    /// Index file size in bytes
    pub size_bytes: u64,

    /// Name of the embedding function the index was built with
    pub embedder: String,

    /// Embedding dimension
    pub dimensions: usize,

    /// When the index was built (RFC 3339)
    pub built_at: String,
}
