//! Data models for search requests and normalized articles.
//!
//! - [`SearchRequest`]: what the user asked for, built once per fetch
//! - [`Article`]: one normalized result row, identical in shape for both backends
//! - [`Backend`]: which upstream a fetcher talks to
//! - [`FetchOutcome`]: the soft-fail result of a fetch (articles + optional diagnostic)
//! - [`SearchReport`]: what gets rendered for the user once a search is done

use crate::error::FetchError;
use chrono::Local;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Smallest page a search may request.
pub const MIN_RESULTS: usize = 5;
/// Largest page a search may request.
pub const MAX_RESULTS: usize = 100;
/// Page size used when nothing else is configured.
pub const DEFAULT_RESULTS: usize = 20;

/// A single search as typed by the user.
///
/// The query and locale are stored raw; trimming and defaulting happen in the
/// fetcher so that a blank query can still be reported as a validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Free text, possibly blank.
    pub query: String,
    /// Page size, always within [`MIN_RESULTS`]..=[`MAX_RESULTS`].
    pub max_results: usize,
    /// Region code (RSS) or language code (API), possibly blank.
    pub locale: String,
}

impl SearchRequest {
    /// Build a request, clamping `max_results` into the supported range.
    pub fn new(query: impl Into<String>, max_results: usize, locale: impl Into<String>) -> Self {
        let clamped = max_results.clamp(MIN_RESULTS, MAX_RESULTS);
        if clamped != max_results {
            warn!(
                requested = max_results,
                clamped,
                "max_results out of range; clamping"
            );
        }
        Self {
            query: query.into(),
            max_results: clamped,
            locale: locale.into(),
        }
    }
}

/// One normalized news article.
///
/// `published` is passed through verbatim from the upstream; no date parsing
/// is attempted. `summary` may contain raw HTML from the feed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub published: String,
    pub summary: String,
    /// Publisher display name. Only the NewsAPI backend fills this in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Upstream a [`NewsFetcher`](crate::fetcher::NewsFetcher) talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Google News RSS search. No credentials needed.
    #[default]
    Rss,
    /// NewsAPI `/v2/everything`. Needs an API key.
    Api,
}

impl Backend {
    /// Locale substituted when the user leaves it blank.
    pub fn default_locale(self) -> &'static str {
        match self {
            Backend::Rss => "IN",
            Backend::Api => "en",
        }
    }

    /// Region codes are upper case, language codes lower case.
    pub fn normalize_locale(self, raw: &str, fallback: &str) -> String {
        let trimmed = raw.trim();
        let locale = if trimmed.is_empty() {
            fallback.trim()
        } else {
            trimmed
        };
        match self {
            Backend::Rss => locale.to_uppercase(),
            Backend::Api => locale.to_lowercase(),
        }
    }
}

/// Result of a soft-failing fetch.
///
/// When `diagnostic` is set, `articles` is empty. A malformed feed that still
/// produced entries is a success and carries no diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchOutcome {
    pub articles: Vec<Article>,
    pub diagnostic: Option<FetchError>,
    /// Bytes discarded while decoding the feed body. Zero for the API backend.
    pub dropped_bytes: usize,
}

impl FetchOutcome {
    pub fn failed(err: FetchError) -> Self {
        Self {
            articles: Vec::new(),
            diagnostic: Some(err),
            dropped_bytes: 0,
        }
    }
}

/// A finished search, ready for rendering.
///
/// Serialized as the JSON output document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchReport {
    /// The query exactly as the user typed it, trimmed.
    pub query: String,
    pub backend: Backend,
    pub locale: String,
    /// The date of the search in `YYYY-MM-DD` format.
    pub local_date: String,
    /// The local time of the search in `HH:MM:SS` format.
    pub local_time: String,
    pub count: usize,
    pub articles: Vec<Article>,
    /// Rendered diagnostic when the search failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchReport {
    pub fn new(
        request: &SearchRequest,
        backend: Backend,
        default_locale: &str,
        outcome: &FetchOutcome,
    ) -> Self {
        let now = Local::now();
        Self {
            query: request.query.trim().to_string(),
            backend,
            locale: backend.normalize_locale(&request.locale, default_locale),
            local_date: now.date_naive().to_string(),
            local_time: now.time().format("%H:%M:%S").to_string(),
            count: outcome.articles.len(),
            articles: outcome.articles.clone(),
            error: outcome.diagnostic.as_ref().map(ToString::to_string),
        }
    }
}
