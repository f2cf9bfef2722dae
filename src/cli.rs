//! Command-line interface definitions for News Finder.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Options that are usually set once per machine (API key, settings file) can
//! also come from environment variables.

use crate::models::{Backend, MAX_RESULTS, MIN_RESULTS};
use clap::{Parser, ValueEnum};

/// How results are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Numbered plain-text list
    #[default]
    Text,
    /// Markdown with headings and links
    Markdown,
    /// JSON document with the query and the articles
    Json,
}

/// Command-line arguments for News Finder.
///
/// # Examples
///
/// ```sh
/// # Google News RSS, default region (IN)
/// news_finder Shankara
///
/// # US edition, 10 results, Markdown output
/// news_finder "Adi Shankaracharya" -l US -n 10 -f markdown
///
/// # NewsAPI backend, key from the environment
/// NEWS_API_KEY=... news_finder "Tesla stock" -b api -l en
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Search term
    #[arg(default_value = "")]
    pub query: String,

    /// Maximum number of articles to return (5-100)
    #[arg(short = 'n', long, value_parser = parse_max_results, value_name = "N")]
    pub max_results: Option<usize>,

    /// Region code for RSS (e.g. IN, US, GB) or language code for the API (e.g. en)
    #[arg(short, long, default_value = "")]
    pub locale: String,

    /// News source to search
    #[arg(short, long, value_enum)]
    pub backend: Option<Backend>,

    /// NewsAPI key (only used by the api backend)
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Optional path to a YAML settings file
    #[arg(short, long, env = "NEWS_FINDER_CONFIG")]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also write the rendered results to this file
    #[arg(short, long)]
    pub output: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    /// Do not append the expansion suffix to single-word RSS queries
    #[arg(long)]
    pub no_expand: bool,

    /// Suffix appended to single-word RSS queries
    #[arg(long, value_name = "SUFFIX")]
    pub expansion_suffix: Option<String>,
}

fn parse_max_results(raw: &str) -> Result<usize, String> {
    let n: usize = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if (MIN_RESULTS..=MAX_RESULTS).contains(&n) {
        Ok(n)
    } else {
        Err(format!("must be between {MIN_RESULTS} and {MAX_RESULTS}"))
    }
}
