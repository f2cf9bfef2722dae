//! HTTP transport used by the news sources.
//!
//! Sources only ever issue a single GET and look at the status and the raw
//! body, so the seam is deliberately narrow:
//! - [`Transport`]: core trait, one async `get`
//! - [`ReqwestTransport`]: production implementation over a shared `reqwest::Client`
//!
//! Tests swap in a canned implementation so that no socket is ever opened.

use crate::error::FetchError;
use crate::utils::{charset_param, redact_api_key};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Status and body of a completed HTTP exchange.
///
/// Non-success statuses are returned as data, not errors; each source decides
/// how to classify them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
    /// `charset` parameter of the `Content-Type` header, when sent.
    pub charset: Option<String>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for issuing a GET request.
///
/// Implementors return `Err` only for transport-level failures (connection,
/// DNS, TLS, timeout). Any response that arrived is `Ok`, whatever its status.
pub trait Transport {
    /// Fetch `url` and return its status and body.
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

/// [`Transport`] backed by a single reusable `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client with a total request timeout and a user agent.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    #[instrument(level = "info", skip_all, fields(url = %redact_api_key(url)))]
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let t0 = Instant::now();
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                let e = e.without_url();
                warn!(
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    timeout = e.is_timeout(),
                    connect = e.is_connect(),
                    error = %e,
                    "GET failed"
                );
                return Err(e.into());
            }
        };

        let status = response.status().as_u16();
        let charset = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(charset_param);
        let body = response.bytes().await?.to_vec();
        debug!(
            status,
            bytes = body.len(),
            charset = charset.as_deref().unwrap_or("-"),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "GET completed"
        );
        Ok(HttpResponse {
            status,
            body,
            charset,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Canned transport for unit tests.

    use super::*;
    use std::sync::Mutex;

    /// Replays one fixed result for every request and records requested URLs.
    #[derive(Debug)]
    pub struct StubTransport {
        result: Result<HttpResponse, FetchError>,
        pub requests: Mutex<Vec<String>>,
    }

    impl StubTransport {
        pub fn ok(status: u16, body: impl Into<Vec<u8>>) -> Self {
            Self {
                result: Ok(HttpResponse {
                    status,
                    body: body.into(),
                    charset: None,
                }),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Report `charset` in the canned response's content type.
        pub fn with_charset(mut self, charset: &str) -> Self {
            if let Ok(response) = &mut self.result {
                response.charset = Some(charset.to_string());
            }
            self
        }

        pub fn failing(err: FetchError) -> Self {
            Self {
                result: Err(err),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn last_url(&self) -> String {
            self.requests.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    impl Transport for StubTransport {
        async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.result.clone()
        }
    }
}
