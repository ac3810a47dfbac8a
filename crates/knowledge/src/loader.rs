//! Fetching article text from URLs.
//!
//! Each URL is fetched over HTTP and reduced to its visible text. URLs
//! that are malformed, unreachable, return an error status, or contain no
//! extractable text are skipped — the load only fails when *nothing*
//! usable came back.

use scraper::{Html, Node};
use url::Url;

use artex_core::{AppError, AppResult};

use crate::types::Document;

/// Fetch and extract text from each URL, in order.
///
/// Returns one `Document` per URL that yielded text. Individual failures
/// are logged and skipped; an empty result is `AppError::NoContent`.
pub async fn load_urls(client: &reqwest::Client, urls: &[String]) -> AppResult<Vec<Document>> {
    if urls.is_empty() {
        return Err(AppError::EmptyInput(
            "At least one URL is required".to_string(),
        ));
    }

    let mut documents = Vec::new();

    for raw_url in urls {
        let url = match Url::parse(raw_url.trim()) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Skipping invalid URL '{}': {}", raw_url, e);
                continue;
            }
        };

        match fetch_text(client, &url).await {
            Ok(text) if !text.is_empty() => {
                tracing::info!("Loaded {} chars from {}", text.chars().count(), url);
                documents.push(Document::new(text, url.to_string()));
            }
            Ok(_) => {
                tracing::warn!("No extractable text at {}", url);
            }
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, e);
            }
        }
    }

    if documents.is_empty() {
        return Err(AppError::NoContent(
            "No content could be extracted from the provided URLs".to_string(),
        ));
    }

    Ok(documents)
}

/// Fetch one URL and reduce the response body to visible text.
async fn fetch_text(client: &reqwest::Client, url: &Url) -> AppResult<String> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| AppError::NoContent(format!("request failed: {}", e)))?
        .error_for_status()
        .map_err(|e| AppError::NoContent(format!("error status: {}", e)))?;

    let body = response
        .text()
        .await
        .map_err(|e| AppError::NoContent(format!("failed to read body: {}", e)))?;

    Ok(extract_text(&body))
}

/// Extract the visible text of an HTML document.
///
/// Text inside `script`, `style`, and `noscript` elements is dropped;
/// everything else is concatenated with whitespace collapsed. Plain-text
/// responses pass through unchanged apart from the collapsing.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut collected = String::new();
    for node in document.tree.root().descendants() {
        if let Node::Text(text) = node.value() {
            let hidden = node.ancestors().any(|ancestor| {
                matches!(
                    ancestor.value(),
                    Node::Element(element)
                        if matches!(element.name(), "script" | "style" | "noscript")
                )
            });
            if !hidden {
                collected.push_str(text);
                collected.push(' ');
            }
        }
    }

    collected.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const PAGE: &str = r#"<html>
        <head>
            <title>Markets</title>
            <style>body { color: red; }</style>
            <script>trackVisit();</script>
        </head>
        <body>
            <h1>Markets rally</h1>
            <p>Stocks climbed <b>sharply</b> on Tuesday.</p>
        </body>
    </html>"#;

    #[test]
    fn test_extract_text_drops_script_and_style() {
        let text = extract_text(PAGE);
        assert!(text.contains("Markets rally"));
        assert!(text.contains("Stocks climbed sharply on Tuesday."));
        assert!(!text.contains("trackVisit"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn test_extract_text_collapses_whitespace() {
        let text = extract_text("<p>a\n\n   b</p>");
        assert_eq!(text, "a b");
    }

    #[tokio::test]
    async fn test_load_urls_returns_documents() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/article");
            then.status(200).body(PAGE);
        });

        let client = reqwest::Client::new();
        let urls = vec![server.url("/article")];
        let documents = load_urls(&client, &urls).await.unwrap();

        assert_eq!(documents.len(), 1);
        assert!(documents[0].text.contains("Markets rally"));
        assert!(documents[0].source_url.contains("/article"));
    }

    #[tokio::test]
    async fn test_failing_urls_are_skipped_not_fatal() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/gone");
            then.status(404);
        });
        server.mock(|when, then| {
            when.method(GET).path("/article");
            then.status(200).body(PAGE);
        });

        let client = reqwest::Client::new();
        let urls = vec![
            server.url("/gone"),
            "not a url at all".to_string(),
            server.url("/article"),
        ];
        let documents = load_urls(&client, &urls).await.unwrap();

        assert_eq!(documents.len(), 1);
    }

    #[tokio::test]
    async fn test_all_failures_is_no_content() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/gone");
            then.status(404);
        });

        let client = reqwest::Client::new();
        let urls = vec![server.url("/gone")];
        let result = load_urls(&client, &urls).await;

        assert!(matches!(result, Err(AppError::NoContent(_))));
    }

    #[tokio::test]
    async fn test_empty_url_list_is_empty_input() {
        let client = reqwest::Client::new();
        let result = load_urls(&client, &[]).await;
        assert!(matches!(result, Err(AppError::EmptyInput(_))));
    }

    #[tokio::test]
    async fn test_blank_page_yields_no_document() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/blank");
            then.status(200).body("<html><body><script>x()</script></body></html>");
        });

        let client = reqwest::Client::new();
        let urls = vec![server.url("/blank")];
        let result = load_urls(&client, &urls).await;

        assert!(matches!(result, Err(AppError::NoContent(_))));
    }
}
