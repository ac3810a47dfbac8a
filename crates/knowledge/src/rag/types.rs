//! RAG response types.

use serde::{Deserialize, Serialize};

/// Maximum snippet length for source previews.
pub const MAX_SNIPPET_LENGTH: usize = 200;

/// One retrieved chunk, as shown to the user: where it came from and a
/// short preview of the evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    /// URL of the article the chunk came from
    pub source_url: String,

    /// First characters of the chunk (truncated at a word boundary)
    pub snippet: String,
}

/// Response to one question: a synthesized answer plus the retrieved
/// chunks that supported it, in retrieval order. Transient — never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagResponse {
    /// Natural language answer synthesized by the LLM
    pub answer: String,

    /// Retrieved chunks used as context, best match first
    pub sources: Vec<SourceRef>,

    /// Model that produced the answer
    pub model: String,
}

/// Truncate a snippet to `max_len` characters, preferring a word boundary.
pub fn truncate_snippet(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }

    let truncated: String = text.chars().take(max_len).collect();
    match truncated.rfind(char::is_whitespace) {
        Some(last_space) => format!("{}...", &truncated[..last_space]),
        None => format!("{}...", truncated),
    }
}
