//! The news fetcher: input normalization, backend dispatch and the
//! soft-fail boundary.
//!
//! # Normalization
//!
//! Applied in this order before anything touches the network:
//! 1. Trim the query; trim the locale and upper-case it (RSS region) or
//!    lower-case it (API language), substituting the default when blank
//! 2. Reject a blank query with [`FetchError::Validation`]
//! 3. (RSS only) expand single-word queries, see [`google_news::search_term`]
//! 4. Percent-encode the search string into the request URL
//!
//! # Failure Policy
//!
//! [`NewsFetcher::fetch`] never returns an error. Every [`FetchError`] is
//! logged and returned as the outcome's diagnostic next to an empty article
//! list, so one failed search never takes the caller down with it.

use crate::error::{ErrorKind, FetchError};
use crate::http::{ReqwestTransport, Transport};
use crate::models::{Backend, FetchOutcome, SearchRequest};
use crate::sources::google_news::{self, GoogleNewsOptions};
use crate::sources::newsapi::{self, NewsApiOptions};
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// Which upstream to search, with its settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    GoogleNews(GoogleNewsOptions),
    NewsApi(NewsApiOptions),
}

impl SourceConfig {
    pub fn backend(&self) -> Backend {
        match self {
            SourceConfig::GoogleNews(_) => Backend::Rss,
            SourceConfig::NewsApi(_) => Backend::Api,
        }
    }
}

/// Searches one configured news source.
///
/// Holds no per-call state: identical requests against an unchanged upstream
/// yield identical outcomes.
#[derive(Debug)]
pub struct NewsFetcher<T = ReqwestTransport> {
    transport: T,
    source: SourceConfig,
    default_locale: String,
}

impl<T: Transport> NewsFetcher<T> {
    /// Create a fetcher using the backend's built-in default locale.
    pub fn new(transport: T, source: SourceConfig) -> Self {
        let default_locale = source.backend().default_locale().to_string();
        Self {
            transport,
            source,
            default_locale,
        }
    }

    /// Override the locale used when a request leaves it blank.
    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        let locale = locale.into();
        if !locale.trim().is_empty() {
            self.default_locale = locale;
        }
        self
    }

    pub fn backend(&self) -> Backend {
        self.source.backend()
    }

    /// Search, reporting failures as a diagnostic instead of an error.
    #[instrument(level = "info", skip_all, fields(backend = ?self.backend(), query = %request.query))]
    pub async fn fetch(&self, request: &SearchRequest) -> FetchOutcome {
        match self.try_fetch(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                match e.kind() {
                    ErrorKind::Validation | ErrorKind::Api => {
                        warn!(kind = ?e.kind(), error = %e, "Search failed")
                    }
                    _ => error!(kind = ?e.kind(), error = %e, "Search failed"),
                }
                FetchOutcome::failed(e)
            }
        }
    }

    /// Search, returning the error kind to callers that want to branch on it.
    ///
    /// An `Ok` outcome never carries a diagnostic.
    pub async fn try_fetch(&self, request: &SearchRequest) -> Result<FetchOutcome, FetchError> {
        let t0 = Instant::now();
        let query = request.query.trim();
        let backend = self.backend();
        let locale = backend.normalize_locale(&request.locale, &self.default_locale);

        if query.is_empty() {
            return Err(FetchError::Validation(
                "search query is empty".to_string(),
            ));
        }

        let outcome = match &self.source {
            SourceConfig::GoogleNews(options) => {
                let page = google_news::search(
                    &self.transport,
                    options,
                    query,
                    &locale,
                    request.max_results,
                )
                .await?;
                FetchOutcome {
                    articles: page.articles,
                    diagnostic: None,
                    dropped_bytes: page.dropped_bytes,
                }
            }
            SourceConfig::NewsApi(options) => {
                let articles = newsapi::search(
                    &self.transport,
                    options,
                    query,
                    &locale,
                    request.max_results,
                )
                .await?;
                FetchOutcome {
                    articles,
                    diagnostic: None,
                    dropped_bytes: 0,
                }
            }
        };

        info!(
            %locale,
            count = outcome.articles.len(),
            max_results = request.max_results,
            dropped_bytes = outcome.dropped_bytes,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Search complete"
        );
        Ok(outcome)
    }
}
