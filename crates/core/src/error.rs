//! Error types for the artex CLI.
//!
//! This module defines a unified error enum that covers every failure
//! category in the application: configuration, input validation, document
//! loading, the persisted index, and the upstream LLM API.

use thiserror::Error;

/// Unified error type for the artex CLI.
///
/// All fallible functions in the application return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated, and every
/// command boundary turns them into a user-facing message.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors, including a missing API credential
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The user supplied nothing to act on (no URLs, empty question)
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// No text could be extracted from any of the supplied URLs
    #[error("No content extracted: {0}")]
    NoContent(String),

    /// A question was asked before any index was built
    #[error("No index found. Process URLs first.")]
    IndexMissing,

    /// The upstream API reported quota exhaustion or rate limiting
    #[error("API rate limit exceeded")]
    RateLimited {
        /// Suggested wait in seconds, when the upstream error text carries one
        retry_after_secs: Option<u64>,
    },

    /// The requested model is not available upstream
    #[error("Model not available: {0}")]
    ModelNotFound(String),

    /// Any other upstream LLM failure
    #[error("LLM error: {0}")]
    Llm(String),

    /// Index and retrieval errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
