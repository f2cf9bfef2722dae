//! Google News RSS search.
//!
//! Searches `https://news.google.com/rss/search` and maps feed entries to
//! [`Article`]s. No API key is needed; the region code selects the edition.
//!
//! # URL Pattern
//!
//! ```text
//! {endpoint}?q={term}&hl={lang}-{REGION}&gl={REGION}&ceid={REGION}:{lang}
//! ```
//!
//! # Search Expansion
//!
//! A one-word query like `Tesla` matches a lot of non-news pages about the
//! word itself, so it is sent as `Tesla news`. Multi-word queries are sent
//! verbatim. Both the switch and the suffix are configurable.

use crate::error::FetchError;
use crate::feed::{FeedEntry, parse_feed};
use crate::http::Transport;
use crate::models::Article;
use crate::utils::{decode_lossy, is_single_token, truncate_for_log};
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://news.google.com/rss/search";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_EXPANSION_SUFFIX: &str = " news";

/// Settings for the RSS search backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleNewsOptions {
    pub endpoint: Url,
    /// UI language paired with the region in `hl` and `ceid`.
    pub language: String,
    /// Append `expansion_suffix` to single-word queries.
    pub expand_single_word: bool,
    pub expansion_suffix: String,
}

impl Default for GoogleNewsOptions {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            language: DEFAULT_LANGUAGE.to_string(),
            expand_single_word: true,
            expansion_suffix: DEFAULT_EXPANSION_SUFFIX.to_string(),
        }
    }
}

/// Articles mapped from one feed, plus the decode loss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RssPage {
    pub articles: Vec<Article>,
    pub dropped_bytes: usize,
}

/// The string actually searched for, given an already trimmed query.
pub fn search_term(query: &str, options: &GoogleNewsOptions) -> String {
    if options.expand_single_word && is_single_token(query) {
        format!("{query}{}", options.expansion_suffix)
    } else {
        query.to_string()
    }
}

/// Build the search URL. `region` is expected upper case.
///
/// Every value is percent-encoded, so a stray `&` in a locale cannot add
/// query parameters.
pub fn search_url(term: &str, region: &str, options: &GoogleNewsOptions) -> String {
    let lang = urlencoding::encode(&options.language);
    let region = urlencoding::encode(region);
    format!(
        "{}?q={}&hl={lang}-{region}&gl={region}&ceid={region}:{lang}",
        options.endpoint.as_str().trim_end_matches('?'),
        urlencoding::encode(term),
    )
}

fn to_article(entry: FeedEntry) -> Article {
    Article {
        title: entry.title.unwrap_or_default(),
        link: entry.link.unwrap_or_default(),
        published: entry.published.unwrap_or_default(),
        summary: entry.summary.unwrap_or_default(),
        source: None,
    }
}

/// Decode and parse a feed body into at most `max_results` articles.
///
/// A malformed document is only an error when nothing could be recovered
/// from it.
///
/// # Arguments
///
/// * `body` - Raw response bytes
/// * `charset` - Encoding announced by the server, overriding the XML declaration
/// * `max_results` - Upper bound on the number of articles returned
///
/// # Returns
///
/// The first `max_results` entries in feed order, with every missing field
/// defaulted to `""`, plus the number of undecodable bytes dropped.
///
/// # Errors
///
/// [`FetchError::Parse`] when the document is malformed and yielded no entries.
pub fn articles_from_body(
    body: &[u8],
    charset: Option<&str>,
    max_results: usize,
) -> Result<RssPage, FetchError> {
    let decoded = decode_lossy(body, charset);
    let feed = parse_feed(&decoded.text);

    if let Some(reason) = &feed.malformed {
        if feed.entries.is_empty() {
            warn!(%reason, body_preview = %truncate_for_log(&decoded.text, 200), "Feed is malformed and has no entries");
            return Err(FetchError::Parse(format!("malformed feed: {reason}")));
        }
        debug!(%reason, recovered = feed.entries.len(), "Feed is malformed; using recovered entries");
    }

    let articles = feed
        .entries
        .into_iter()
        .take(max_results)
        .map(to_article)
        .collect();
    Ok(RssPage {
        articles,
        dropped_bytes: decoded.dropped_bytes,
    })
}

/// Run one search against the RSS endpoint.
///
/// # Arguments
///
/// * `transport` - Where the GET is sent
/// * `options` - Endpoint, feed language and expansion settings
/// * `query` - Trimmed, non-empty query
/// * `region` - Normalized (upper-case) region code
/// * `max_results` - Upper bound on the number of articles returned
///
/// # Returns
///
/// The mapped page, or the first failure: [`FetchError::Network`] from the
/// transport, [`FetchError::HttpStatus`] for a non-2xx reply, or
/// [`FetchError::Parse`] for an unusable feed.
#[instrument(level = "info", skip(transport, options))]
pub async fn search<T: Transport>(
    transport: &T,
    options: &GoogleNewsOptions,
    query: &str,
    region: &str,
    max_results: usize,
) -> Result<RssPage, FetchError> {
    let term = search_term(query, options);
    let url = search_url(&term, region, options);
    debug!(%term, %url, "Searching Google News RSS");

    let response = transport.get(&url).await?;
    if !response.is_success() {
        let preview = truncate_for_log(&String::from_utf8_lossy(&response.body), 200);
        warn!(status = response.status, body_preview = %preview, "RSS search returned non-success status");
        return Err(FetchError::HttpStatus {
            status: response.status,
            message: format!("Google News returned status {}", response.status),
        });
    }

    let page = articles_from_body(&response.body, response.charset.as_deref(), max_results)?;
    info!(
        count = page.articles.len(),
        dropped_bytes = page.dropped_bytes,
        "Fetched Google News articles"
    );
    Ok(page)
}
