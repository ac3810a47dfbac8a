//! RAG answering orchestration.
//!
//! Retrieves the most similar chunks from the persisted index and asks the
//! LLM to synthesize an answer from them. One completion request per
//! question; failures are classified upstream and surfaced as-is — nothing
//! here retries.

use std::path::Path;

use artex_core::{AppConfig, AppError, AppResult};
use artex_llm::{LlmClient, LlmRequest};

use crate::embeddings;
use crate::index;
use crate::rag::types::{truncate_snippet, RagResponse, SourceRef, MAX_SNIPPET_LENGTH};
use crate::types::Chunk;

/// Sampling temperature for answers.
const ANSWER_TEMPERATURE: f32 = 0.7;

/// Cap on generated answer length.
const MAX_ANSWER_TOKENS: u32 = 300;

/// Answer a question from the persisted index.
///
/// The flow: check the index exists, embed the question with the same
/// embedding function the index was built with, retrieve the top-k chunks,
/// and send one completion request carrying them as context. The LLM is
/// never contacted when the index is missing.
pub async fn ask(
    config: &AppConfig,
    llm: &dyn LlmClient,
    model: &str,
    question: &str,
) -> AppResult<RagResponse> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AppError::EmptyInput("Question is empty".to_string()));
    }

    let index_path = config.index_path();
    if !index_path.exists() {
        return Err(AppError::IndexMissing);
    }

    tracing::info!("Answering question against index at {:?}", index_path);

    let retrieved = retrieve(&index_path, question, config.top_k).await?;
    if retrieved.is_empty() {
        return Err(AppError::Knowledge(
            "The index contains no chunks; rebuild it".to_string(),
        ));
    }

    let context = build_context(&retrieved);
    let prompt = format!(
        "Question:\n{}\n\nRelevant excerpts from the processed articles:\n{}",
        question, context
    );

    let request = LlmRequest::new(prompt, model)
        .with_system(system_prompt())
        .with_temperature(ANSWER_TEMPERATURE)
        .with_max_tokens(MAX_ANSWER_TOKENS);

    let response = llm.complete(&request).await?;

    let sources = retrieved
        .iter()
        .map(|chunk| SourceRef {
            source_url: chunk.source_url.clone(),
            snippet: truncate_snippet(&chunk.text, MAX_SNIPPET_LENGTH),
        })
        .collect();

    Ok(RagResponse {
        answer: response.content,
        sources,
        model: model.to_string(),
    })
}

/// Embed the question and pull the top-k most similar chunks.
async fn retrieve(index_path: &Path, question: &str, top_k: usize) -> AppResult<Vec<Chunk>> {
    let provider = embeddings::default_provider();
    let query_embedding = provider.embed(question).await?;

    let conn = index::open_index(index_path)?;
    let results = index::query_chunks(&conn, &query_embedding, top_k)?;

    tracing::debug!(
        "Retrieved {} chunks (top score: {:.3})",
        results.len(),
        results.first().map(|(_, s)| *s).unwrap_or(0.0)
    );

    Ok(results.into_iter().map(|(chunk, _score)| chunk).collect())
}

/// Number the retrieved chunks for the prompt.
fn build_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("[Excerpt {}]\n{}", i + 1, chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

fn system_prompt() -> String {
    "You are a research assistant answering questions about a set of news articles.\n\
     Instructions:\n\
     - Answer only from the excerpts provided\n\
     - Do not refer to \"excerpts\", \"chunks\", or excerpt numbers; state the facts directly\n\
     - If the excerpts do not contain the answer, say so plainly\n\
     - Keep the answer concise and factual\n"
        .to_string()
}
