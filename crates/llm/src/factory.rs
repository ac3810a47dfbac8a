//! LLM client construction and startup model selection.
//!
//! `select_model` walks the ordered model fallback list once per process,
//! probing each candidate with a minimal completion request and keeping the
//! first one that is not rate limited. Selection is best-effort and happens
//! at construction, never per query.

use crate::classify::is_rate_limited;
use crate::client::{LlmClient, LlmRequest};
use crate::providers::GeminiClient;
use artex_core::{AppError, AppResult};
use std::sync::Arc;

/// Create the Gemini client from a resolved API credential.
pub fn create_client(api_key: &str) -> Arc<dyn LlmClient> {
    Arc::new(GeminiClient::new(api_key))
}

/// Pick a model from the ordered fallback list.
///
/// Each candidate is probed with a minimal completion request. The first
/// candidate whose probe is not rate limited is selected — including
/// candidates whose probe fails for some other reason, since the per-query
/// path will surface that error with full context. If every candidate is
/// rate limited, the last entry is used unconditionally.
pub async fn select_model(client: &dyn LlmClient, models: &[String]) -> AppResult<String> {
    let Some(last) = models.last() else {
        return Err(AppError::Config("Model fallback list is empty".to_string()));
    };

    for model in models {
        let probe = LlmRequest::new("ping", model.clone()).with_max_tokens(1);

        match client.complete(&probe).await {
            Ok(_) => {
                tracing::info!("Selected model '{}'", model);
                return Ok(model.clone());
            }
            Err(err) if is_rate_limited(&err) => {
                tracing::warn!("Model '{}' is rate limited, trying next", model);
                continue;
            }
            Err(err) => {
                // Non-fatal selection: keep the model and let the real
                // query report the error with its full classification
                tracing::warn!("Probe for '{}' failed ({}); selecting it anyway", model, err);
                return Ok(model.clone());
            }
        }
    }

    tracing::warn!(
        "All models rate limited; falling back to '{}'. Wait a minute and retry.",
        last
    );
    Ok(last.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use artex_core::AppError;
    use crate::client::LlmResponse;
    use std::sync::Mutex;

    /// Scripted client: pops one result per probe.
    struct ScriptedClient {
        results: Mutex<Vec<AppResult<LlmResponse>>>,
    }

    impl ScriptedClient {
        fn new(results: Vec<AppResult<LlmResponse>>) -> Self {
            Self {
                results: Mutex::new(results),
            }
        }

        fn ok(model: &str) -> AppResult<LlmResponse> {
            Ok(LlmResponse {
                content: "pong".to_string(),
                model: model.to_string(),
                usage: Default::default(),
            })
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedClient {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, _request: &LlmRequest) -> AppResult<LlmResponse> {
            self.results.lock().unwrap().remove(0)
        }
    }

    fn models() -> Vec<String> {
        vec![
            "gemini-1.5-flash".to_string(),
            "gemini-1.5-pro".to_string(),
            "gemini-1.0-pro".to_string(),
        ]
    }

    #[tokio::test]
    async fn test_first_healthy_model_wins() {
        let client = ScriptedClient::new(vec![ScriptedClient::ok("gemini-1.5-flash")]);
        let selected = select_model(&client, &models()).await.unwrap();
        assert_eq!(selected, "gemini-1.5-flash");
    }

    #[tokio::test]
    async fn test_rate_limited_models_are_skipped() {
        let client = ScriptedClient::new(vec![
            Err(AppError::RateLimited {
                retry_after_secs: Some(10),
            }),
            ScriptedClient::ok("gemini-1.5-pro"),
        ]);
        let selected = select_model(&client, &models()).await.unwrap();
        assert_eq!(selected, "gemini-1.5-pro");
    }

    #[tokio::test]
    async fn test_non_rate_limit_error_still_selects() {
        let client = ScriptedClient::new(vec![Err(AppError::Llm("transient".to_string()))]);
        let selected = select_model(&client, &models()).await.unwrap();
        assert_eq!(selected, "gemini-1.5-flash");
    }

    #[tokio::test]
    async fn test_all_rate_limited_falls_back_to_last() {
        let rate_limited = || {
            Err(AppError::RateLimited {
                retry_after_secs: None,
            })
        };
        let client = ScriptedClient::new(vec![rate_limited(), rate_limited(), rate_limited()]);
        let selected = select_model(&client, &models()).await.unwrap();
        assert_eq!(selected, "gemini-1.0-pro");
    }

    #[tokio::test]
    async fn test_empty_model_list_is_config_error() {
        let client = ScriptedClient::new(vec![]);
        let result = select_model(&client, &[]).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
