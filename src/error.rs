//! Error kinds produced by a news fetch.
//!
//! Every failure a single fetch can run into is one variant of [`FetchError`].
//! The fetcher never lets these escape as a process failure: they are logged
//! and handed back to the caller as the diagnostic of a
//! [`FetchOutcome`](crate::models::FetchOutcome), so the caller can decide how
//! to present each kind.

use thiserror::Error;

/// Failure classes of a single fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request was rejected before any network call (e.g. blank query).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Connection, DNS, TLS or timeout failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The upstream answered with a non-success HTTP status.
    #[error("HTTP error (status {status}): {message}")]
    HttpStatus { status: u16, message: String },

    /// The body could not be understood (malformed JSON, or a malformed feed
    /// that yielded no entries at all).
    #[error("Parse error: {0}")]
    Parse(String),

    /// Well-formed API response whose status is not the success sentinel.
    #[error("API error{}: {message}", code_suffix(.code))]
    Api {
        code: Option<String>,
        message: String,
    },
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default()
}

/// Fieldless mirror of [`FetchError`] for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Network,
    HttpStatus,
    Parse,
    Api,
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Validation(_) => ErrorKind::Validation,
            FetchError::Network(_) => ErrorKind::Network,
            FetchError::HttpStatus { .. } => ErrorKind::HttpStatus,
            FetchError::Parse(_) => ErrorKind::Parse,
            FetchError::Api { .. } => ErrorKind::Api,
        }
    }

    /// Short user-facing hint for the terminal, one per kind.
    pub fn hint(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Validation => "Please enter a search term.",
            ErrorKind::Network => "Could not reach the news service. Check your connection.",
            ErrorKind::HttpStatus => "The news service rejected the request.",
            ErrorKind::Parse => "The news service returned a response that could not be read.",
            ErrorKind::Api => "The news service reported an error.",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // Strip the URL: it may carry the API key as a query parameter.
        FetchError::Network(err.without_url().to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_code_when_present() {
        let err = FetchError::Api {
            code: Some("rateLimited".into()),
            message: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "API error (rateLimited): rate limited");

        let err = FetchError::Api {
            code: None,
            message: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "API error: rate limited");
    }

    #[test]
    fn kind_matches_variant() {
        assert_eq!(
            FetchError::Validation("empty".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            FetchError::HttpStatus {
                status: 503,
                message: String::new()
            }
            .kind(),
            ErrorKind::HttpStatus
        );
        assert_eq!(FetchError::Parse("x".into()).kind(), ErrorKind::Parse);
    }

    #[test]
    fn json_errors_become_parse_errors() {
        let err: FetchError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }
}
