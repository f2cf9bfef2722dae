//! Runtime settings.
//!
//! Settings are resolved once at startup, in increasing precedence:
//! 1. Built-in defaults
//! 2. An optional YAML file (`--config` / `NEWS_FINDER_CONFIG`)
//! 3. Command-line flags and their environment variables
//!
//! # Example File
//!
//! ```yaml
//! backend: api
//! max_results: 30
//! language: en
//! api_key: "..."        # usually better supplied via NEWS_API_KEY
//! timeout_secs: 10
//! expand_single_word: true
//! expansion_suffix: " news"
//! ```

use crate::cli::Cli;
use crate::fetcher::SourceConfig;
use crate::models::{Backend, DEFAULT_RESULTS};
use crate::sources::google_news::{self, GoogleNewsOptions};
use crate::sources::newsapi::{self, NewsApiOptions};
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = concat!("news_finder/", env!("CARGO_PKG_VERSION"));

/// Contents of the optional YAML settings file. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub backend: Option<Backend>,
    pub max_results: Option<usize>,
    /// Default region for the RSS backend (e.g. `IN`, `US`).
    pub region: Option<String>,
    /// Default language for the API backend (e.g. `en`).
    pub language: Option<String>,
    pub rss_endpoint: Option<String>,
    /// Language paired with the region in RSS search URLs.
    pub rss_language: Option<String>,
    pub api_endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub expand_single_word: Option<bool>,
    pub expansion_suffix: Option<String>,
}

/// Load a YAML settings file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_file(path: &Path) -> Result<FileSettings, Box<dyn Error>> {
    let raw = tokio::fs::read_to_string(path).await?;
    let settings: FileSettings = serde_yaml::from_str(&raw)?;
    info!("Loaded settings file");
    debug!(?settings.backend, ?settings.max_results, "File settings");
    Ok(settings)
}

/// Fully resolved settings.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub backend: Backend,
    pub max_results: usize,
    /// Locale used when a search does not name one.
    pub default_locale: String,
    pub rss_endpoint: Url,
    pub rss_language: String,
    pub api_endpoint: Url,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
    pub expand_single_word: bool,
    pub expansion_suffix: String,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("backend", &self.backend)
            .field("max_results", &self.max_results)
            .field("default_locale", &self.default_locale)
            .field("rss_endpoint", &self.rss_endpoint.as_str())
            .field("rss_language", &self.rss_language)
            .field("api_endpoint", &self.api_endpoint.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("expand_single_word", &self.expand_single_word)
            .field("expansion_suffix", &self.expansion_suffix)
            .finish()
    }
}

/// Configuration problems detected at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name} URL {value:?}: {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        source: url::ParseError,
    },

    #[error("the api backend needs an API key (use --api-key or NEWS_API_KEY)")]
    MissingApiKey,
}

fn parse_endpoint(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        source,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Settings {
    /// Merge file settings with command-line overrides.
    pub fn resolve(file: FileSettings, cli: &Cli) -> Result<Self, ConfigError> {
        let backend = cli.backend.or(file.backend).unwrap_or_default();
        let max_results = cli
            .max_results
            .or(file.max_results)
            .unwrap_or(DEFAULT_RESULTS);

        let default_locale = match backend {
            Backend::Rss => non_blank(file.region),
            Backend::Api => non_blank(file.language),
        }
        .unwrap_or_else(|| backend.default_locale().to_string());

        let rss_endpoint = parse_endpoint(
            "rss_endpoint",
            file.rss_endpoint
                .as_deref()
                .unwrap_or(google_news::DEFAULT_ENDPOINT),
        )?;
        let api_endpoint = parse_endpoint(
            "api_endpoint",
            file.api_endpoint
                .as_deref()
                .unwrap_or(newsapi::DEFAULT_ENDPOINT),
        )?;

        let expand_single_word = if cli.no_expand {
            false
        } else {
            file.expand_single_word.unwrap_or(true)
        };
        let expansion_suffix = cli
            .expansion_suffix
            .clone()
            .or(file.expansion_suffix)
            .unwrap_or_else(|| google_news::DEFAULT_EXPANSION_SUFFIX.to_string());

        let timeout_secs = cli
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            backend,
            max_results,
            default_locale,
            rss_endpoint,
            rss_language: non_blank(file.rss_language)
                .unwrap_or_else(|| google_news::DEFAULT_LANGUAGE.to_string()),
            api_endpoint,
            api_key: non_blank(cli.api_key.clone()).or_else(|| non_blank(file.api_key)),
            timeout: Duration::from_secs(timeout_secs),
            user_agent: non_blank(file.user_agent)
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            expand_single_word,
            expansion_suffix,
        })
    }

    /// Source settings for the selected backend.
    ///
    /// The API key is only required when the API backend is selected.
    pub fn source_config(&self) -> Result<SourceConfig, ConfigError> {
        match self.backend {
            Backend::Rss => Ok(SourceConfig::GoogleNews(GoogleNewsOptions {
                endpoint: self.rss_endpoint.clone(),
                language: self.rss_language.clone(),
                expand_single_word: self.expand_single_word,
                expansion_suffix: self.expansion_suffix.clone(),
            })),
            Backend::Api => {
                let api_key = self.api_key.clone().ok_or(ConfigError::MissingApiKey)?;
                Ok(SourceConfig::NewsApi(NewsApiOptions {
                    endpoint: self.api_endpoint.clone(),
                    ..NewsApiOptions::new(api_key)
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["news_finder"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(FileSettings::default(), &cli(&["Tesla"])).unwrap();
        assert_eq!(settings.backend, Backend::Rss);
        assert_eq!(settings.max_results, DEFAULT_RESULTS);
        assert_eq!(settings.default_locale, "IN");
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert!(settings.expand_single_word);
        assert_eq!(settings.expansion_suffix, " news");
        assert_eq!(settings.rss_language, "en");
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileSettings {
            backend: Some(Backend::Rss),
            max_results: Some(50),
            timeout_secs: Some(30),
            expand_single_word: Some(true),
            ..Default::default()
        };
        let settings = Settings::resolve(
            file,
            &cli(&["Tesla", "-b", "api", "-n", "15", "--timeout-secs", "5", "--no-expand", "--api-key", "k"]),
        )
        .unwrap();
        assert_eq!(settings.backend, Backend::Api);
        assert_eq!(settings.max_results, 15);
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert!(!settings.expand_single_word);
        assert_eq!(settings.default_locale, "en");
        assert_eq!(settings.api_key.as_deref(), Some("k"));
    }

    /// Parsed arguments with any `NEWS_API_KEY` from the environment removed.
    fn cli_without_env_key(args: &[&str]) -> Cli {
        let mut cli = cli(args);
        cli.api_key = None;
        cli
    }

    #[test]
    fn test_api_backend_requires_key() {
        let settings = Settings::resolve(
            FileSettings::default(),
            &cli_without_env_key(&["Tesla", "-b", "api"]),
        )
        .unwrap();
        assert_eq!(settings.api_key, None);
        assert!(matches!(
            settings.source_config(),
            Err(ConfigError::MissingApiKey)
        ));

        let blank = FileSettings {
            api_key: Some("   ".into()),
            ..Default::default()
        };
        let settings =
            Settings::resolve(blank, &cli_without_env_key(&["Tesla", "-b", "api"])).unwrap();
        assert!(matches!(
            settings.source_config(),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn test_api_key_from_file_builds_api_source() {
        let file = FileSettings {
            api_key: Some("from-file".into()),
            ..Default::default()
        };
        let settings = Settings::resolve(file, &cli_without_env_key(&["Tesla", "-b", "api"])).unwrap();
        match settings.source_config().unwrap() {
            SourceConfig::NewsApi(options) => {
                assert_eq!(options.api_key, "from-file");
                assert_eq!(options.endpoint.as_str(), newsapi::DEFAULT_ENDPOINT);
            }
            other => panic!("expected NewsApi source, got {other:?}"),
        }
    }

    #[test]
    fn test_rss_backend_needs_no_key() {
        let settings =
            Settings::resolve(FileSettings::default(), &cli_without_env_key(&["Tesla"])).unwrap();
        assert!(matches!(
            settings.source_config(),
            Ok(SourceConfig::GoogleNews(_))
        ));
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let file = FileSettings {
            rss_endpoint: Some("not a url".into()),
            ..Default::default()
        };
        let err = Settings::resolve(file, &cli(&["Tesla"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { name: "rss_endpoint", .. }));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let settings = Settings::resolve(
            FileSettings::default(),
            &cli(&["Tesla", "--api-key", "supersecret"]),
        )
        .unwrap();
        assert!(!format!("{settings:?}").contains("supersecret"));
    }

    #[test]
    fn test_yaml_file_parsing() {
        let yaml = r#"
backend: api
max_results: 30
language: de
api_key: from-file
expansion_suffix: " latest"
"#;
        let file: FileSettings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.backend, Some(Backend::Api));
        assert_eq!(file.max_results, Some(30));

        let settings = Settings::resolve(file, &cli(&["Tesla"])).unwrap();
        assert_eq!(settings.default_locale, "de");
        assert_eq!(settings.expansion_suffix, " latest");
        assert!(matches!(
            settings.source_config(),
            Ok(SourceConfig::NewsApi(_))
        ));
    }

    #[test]
    fn test_yaml_rejects_unknown_keys() {
        assert!(serde_yaml::from_str::<FileSettings>("colour: blue").is_err());
    }

    #[tokio::test]
    async fn test_load_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("news_finder.yaml");
        tokio::fs::write(&path, "region: US\ntimeout_secs: 3\n").await.unwrap();

        let file = load_file(&path).await.unwrap();
        assert_eq!(file.region.as_deref(), Some("US"));
        assert_eq!(file.timeout_secs, Some(3));
    }
}
