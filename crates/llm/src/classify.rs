//! Classification of upstream LLM API failures.
//!
//! The Gemini provider maps HTTP status codes to structured errors first;
//! the text rules here are the fallback for errors that only surface as
//! free-form message text. Classification exists to produce a clearer
//! user-facing message — it never triggers a retry.

use artex_core::AppError;
use regex::Regex;
use std::sync::OnceLock;

/// Classify an upstream error message into a structured `AppError`.
///
/// Case-insensitive substring rules, matching what the upstream actually
/// embeds in its error text:
/// - "quota" or "rate_limit" → `RateLimited` (with extracted wait, if any)
/// - "model_not_found" → `ModelNotFound`
/// - anything else → generic `Llm`
pub fn classify_upstream_error(message: &str) -> AppError {
    let lower = message.to_lowercase();

    if lower.contains("quota") || lower.contains("rate_limit") {
        AppError::RateLimited {
            retry_after_secs: extract_retry_delay(message),
        }
    } else if lower.contains("model_not_found") {
        AppError::ModelNotFound(message.to_string())
    } else {
        AppError::Llm(message.to_string())
    }
}

/// Extract the suggested wait from a `retry_delay { seconds: N }` annotation
/// embedded in upstream error text.
pub fn extract_retry_delay(message: &str) -> Option<u64> {
    static RETRY_DELAY: OnceLock<Regex> = OnceLock::new();
    let re = RETRY_DELAY.get_or_init(|| {
        Regex::new(r"retry_delay\s*\{\s*seconds:\s*(\d+)").expect("retry_delay pattern is valid")
    });

    re.captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Whether an error is the rate-limit variant (used by model selection).
pub fn is_rate_limited(error: &AppError) -> bool {
    matches!(error, AppError::RateLimited { .. })
}
