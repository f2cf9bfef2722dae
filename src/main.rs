//! # News Finder
//!
//! Search recent news for a term and print the results as text, Markdown or
//! JSON.
//!
//! ## Sources
//!
//! - **Google News RSS search** (default): no API key, region-based editions
//! - **NewsAPI `/v2/everything`**: needs an API key, language-based
//!
//! ## Usage
//!
//! ```sh
//! news_finder Shankara
//! news_finder "Tesla stock" -b api -l en -n 10 -f json
//! ```
//!
//! ## Flow
//!
//! 1. **Settings**: defaults, then the optional YAML file, then CLI flags
//! 2. **Fetch**: one GET against the selected source, normalized to articles
//! 3. **Output**: render the results to stdout (and optionally a file)
//!
//! A failed search is reported and the process still exits successfully; only
//! configuration problems are fatal.

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod feed;
mod fetcher;
mod http;
mod models;
mod outputs;
mod sources;
mod utils;

use cli::Cli;
use config::{FileSettings, Settings};
use fetcher::NewsFetcher;
use http::ReqwestTransport;
use models::{SearchReport, SearchRequest};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_finder starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(query = %args.query, ?args.backend, ?args.max_results, "Parsed CLI arguments");

    // ---- Settings ----
    let file_settings = match &args.config {
        Some(path) => match config::load_file(Path::new(path)).await {
            Ok(settings) => settings,
            Err(e) => {
                error!(%path, error = %e, "Failed to load settings file");
                return Err(e);
            }
        },
        None => FileSettings::default(),
    };
    let settings = Settings::resolve(file_settings, &args)?;
    info!(backend = ?settings.backend, max_results = settings.max_results, "Settings resolved");
    debug!(?settings, "Full settings");

    let source = settings.source_config()?;
    let transport = ReqwestTransport::new(settings.timeout, &settings.user_agent)?;
    let fetcher = NewsFetcher::new(transport, source).with_default_locale(&settings.default_locale);

    // ---- Fetch ----
    let request = SearchRequest::new(&args.query, settings.max_results, &args.locale);
    let outcome = fetcher.fetch(&request).await;
    if let Some(diagnostic) = &outcome.diagnostic {
        eprintln!("{} ({diagnostic})", diagnostic.hint());
    }
    if outcome.dropped_bytes > 0 {
        warn!(dropped_bytes = outcome.dropped_bytes, "Some feed bytes could not be decoded");
    }

    // ---- Output ----
    let report = SearchReport::new(&request, fetcher.backend(), &settings.default_locale, &outcome);
    let rendered = outputs::render(&report, args.format)?;
    print!("{rendered}");

    if let Some(path) = &args.output {
        if let Err(e) = outputs::write_output(Path::new(path), &rendered).await {
            error!(%path, error = %e, "Failed to write output file");
            return Err(e);
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        articles = report.count,
        failed = report.error.is_some(),
        "Execution complete"
    );
    Ok(())
}
