//! NewsAPI `/v2/everything` search.
//!
//! Requires an API key, injected through configuration. Results are sorted by
//! publish time (newest first) by the upstream; the order is kept as returned.
//!
//! # Response Shape
//!
//! ```json
//! {"status": "ok", "totalResults": 2, "articles": [
//!   {"source": {"id": null, "name": "Reuters"}, "title": "...", "url": "...",
//!    "publishedAt": "2026-10-12T07:00:00Z", "description": "..."}
//! ]}
//! {"status": "error", "code": "rateLimited", "message": "..."}
//! ```

use crate::error::FetchError;
use crate::http::Transport;
use crate::models::Article;
use crate::utils::{redact_api_key, truncate_for_log};
use serde::Deserialize;
use std::fmt;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://newsapi.org/v2/everything";

const NO_TITLE: &str = "No Title";
const UNKNOWN_SOURCE: &str = "Unknown Source";

/// Settings for the keyed API backend.
#[derive(Clone, PartialEq, Eq)]
pub struct NewsApiOptions {
    pub endpoint: Url,
    pub api_key: String,
}

impl NewsApiOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            api_key: api_key.into(),
        }
    }
}

impl fmt::Debug for NewsApiOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiOptions")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"***")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    articles: Option<Vec<ApiArticle>>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    source: Option<ApiSource>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiSource {
    #[serde(default)]
    name: Option<String>,
}

impl From<ApiArticle> for Article {
    fn from(a: ApiArticle) -> Self {
        Article {
            title: a.title.unwrap_or_else(|| NO_TITLE.to_string()),
            link: a.url.unwrap_or_default(),
            published: a.published_at.unwrap_or_default(),
            summary: a.description.unwrap_or_default(),
            source: Some(
                a.source
                    .and_then(|s| s.name)
                    .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            ),
        }
    }
}

/// Build the request URL. `language` is expected lower case.
pub fn search_url(query: &str, language: &str, page_size: usize, options: &NewsApiOptions) -> String {
    let mut url = options.endpoint.clone();
    url.query_pairs_mut()
        .append_pair("q", query)
        .append_pair("sortBy", "publishedAt")
        .append_pair("language", language)
        .append_pair("pageSize", &page_size.to_string())
        .append_pair("apiKey", &options.api_key);
    url.into()
}

/// Interpret a successful (2xx) response body.
///
/// # Returns
///
/// Up to `max_results` articles in upstream order, or [`FetchError::Parse`]
/// for malformed JSON and [`FetchError::Api`] when `status` is not `"ok"`.
pub fn articles_from_body(body: &[u8], max_results: usize) -> Result<Vec<Article>, FetchError> {
    let response: EverythingResponse = serde_json::from_slice(body)?;
    if response.status != "ok" {
        let message = response
            .message
            .unwrap_or_else(|| format!("status {:?}", response.status));
        return Err(FetchError::Api {
            code: response.code,
            message,
        });
    }

    Ok(response
        .articles
        .unwrap_or_default()
        .into_iter()
        .take(max_results)
        .map(Article::from)
        .collect())
}

/// Prefer the message NewsAPI puts in its JSON error bodies.
fn http_error_message(body: &[u8]) -> String {
    serde_json::from_slice::<EverythingResponse>(body)
        .ok()
        .and_then(|r| r.message)
        .unwrap_or_else(|| truncate_for_log(&String::from_utf8_lossy(body), 200))
}

/// Run one search against the API.
///
/// # Arguments
///
/// * `transport` - Where the GET is sent
/// * `options` - Endpoint and API key
/// * `query` - Trimmed, non-empty query
/// * `language` - Normalized (lower-case) language code
/// * `max_results` - Sent as `pageSize` and enforced locally
///
/// # Returns
///
/// The mapped articles, or one [`FetchError`]. A non-2xx reply becomes
/// [`FetchError::HttpStatus`] carrying the message from NewsAPI's JSON error
/// body when it has one.
#[instrument(level = "info", skip(transport, options))]
pub async fn search<T: Transport>(
    transport: &T,
    options: &NewsApiOptions,
    query: &str,
    language: &str,
    max_results: usize,
) -> Result<Vec<Article>, FetchError> {
    let url = search_url(query, language, max_results, options);
    debug!(url = %redact_api_key(&url), "Searching NewsAPI");

    let response = transport.get(&url).await?;
    if !response.is_success() {
        let message = http_error_message(&response.body);
        warn!(status = response.status, %message, "NewsAPI returned non-success status");
        return Err(FetchError::HttpStatus {
            status: response.status,
            message,
        });
    }

    let articles = articles_from_body(&response.body, max_results)?;
    info!(count = articles.len(), "Fetched NewsAPI articles");
    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::StubTransport;

    const OK_BODY: &str = r#"{
        "status": "ok",
        "totalResults": 3,
        "articles": [
            {"source": {"id": "reuters", "name": "Reuters"}, "author": "A",
             "title": "Tesla deliveries beat", "url": "https://example.com/1",
             "publishedAt": "2026-10-12T07:00:00Z", "description": "Deliveries rose."},
            {"source": {"id": null, "name": null}, "title": null, "url": "https://example.com/2",
             "publishedAt": "2026-10-12T06:00:00Z", "description": null},
            {}
        ]
    }"#;

    #[test]
    fn test_search_url_parameters() {
        let options = NewsApiOptions::new("secret");
        let url = search_url("Tesla stock", "en", 20, &options);
        assert_eq!(
            url,
            "https://newsapi.org/v2/everything?q=Tesla+stock&sortBy=publishedAt&language=en&pageSize=20&apiKey=secret"
        );
    }

    #[test]
    fn test_maps_articles_with_defaults() {
        let articles = articles_from_body(OK_BODY.as_bytes(), 20).unwrap();
        assert_eq!(articles.len(), 3);

        assert_eq!(articles[0].title, "Tesla deliveries beat");
        assert_eq!(articles[0].source.as_deref(), Some("Reuters"));
        assert_eq!(articles[0].published, "2026-10-12T07:00:00Z");
        assert_eq!(articles[0].summary, "Deliveries rose.");

        assert_eq!(articles[1].title, "No Title");
        assert_eq!(articles[1].source.as_deref(), Some("Unknown Source"));
        assert_eq!(articles[1].summary, "");

        assert_eq!(
            articles[2],
            Article {
                title: "No Title".into(),
                link: String::new(),
                published: String::new(),
                summary: String::new(),
                source: Some("Unknown Source".into()),
            }
        );
    }

    #[test]
    fn test_truncates_to_max_results() {
        let articles = articles_from_body(OK_BODY.as_bytes(), 2).unwrap();
        assert_eq!(articles.len(), 2);
    }

    #[test]
    fn test_error_status_carries_message() {
        let body = br#"{"status":"error","message":"rate limited"}"#;
        let err = articles_from_body(body, 20).unwrap_err();
        assert!(matches!(err, FetchError::Api { .. }));
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = articles_from_body(b"{\"status\": \"ok\", \"articles\": [", 20).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", NewsApiOptions::new("secret"));
        assert!(!rendered.contains("secret"));
    }

    #[tokio::test]
    async fn test_search_http_error_uses_json_message() {
        let transport = StubTransport::ok(
            401,
            r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#,
        );
        let options = NewsApiOptions::new("bad");
        let err = search(&transport, &options, "Tesla", "en", 20)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FetchError::HttpStatus {
                status: 401,
                message: "Your API key is invalid.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_search_does_not_expand_single_word() {
        let transport = StubTransport::ok(200, OK_BODY);
        let options = NewsApiOptions::new("k");
        search(&transport, &options, "Tesla", "de", 10).await.unwrap();
        let url = transport.last_url();
        assert!(url.contains("q=Tesla&"), "{url}");
        assert!(url.contains("language=de"), "{url}");
        assert!(url.contains("pageSize=10"), "{url}");
    }
}
