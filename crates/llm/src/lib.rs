//! LLM integration crate for the artex CLI.
//!
//! Provides a provider-agnostic abstraction for completion requests, a
//! Gemini implementation, classification of upstream API failures, and the
//! startup model-fallback selection.
//!
//! # Example
//! ```no_run
//! use artex_llm::{LlmClient, LlmRequest, providers::GeminiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new("api-key");
//! let request = LlmRequest::new("Hello, world!", "gemini-1.5-flash");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use classify::{classify_upstream_error, extract_retry_delay};
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::{create_client, select_model};
pub use providers::GeminiClient;
