//! Output generation for finished searches.
//!
//! # Submodules
//!
//! - [`text`]: numbered plain-text list for the terminal
//! - [`markdown`]: headings, captions and "Read full article" links
//! - [`json`]: the [`SearchReport`] serialized as a JSON document
//!
//! Rendered output goes to stdout; [`write_output`] can also save it to a file.

pub mod json;
pub mod markdown;
pub mod text;

use crate::cli::OutputFormat;
use crate::models::SearchReport;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Render a report in the requested format.
pub fn render(report: &SearchReport, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(text::report_to_text(report)),
        OutputFormat::Markdown => Ok(markdown::report_to_markdown(report)),
        OutputFormat::Json => json::report_to_json(report),
    }
}

/// Write rendered output to `path`, creating parent directories as needed.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_output(path: &Path, rendered: &str) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(parent = %parent.display(), error = %e, "Failed to create output directory");
            return Err(e.into());
        }
    }
    fs::write(path, rendered).await?;
    info!(bytes = rendered.len(), "Wrote output file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, Backend};

    pub(crate) fn sample_report(articles: Vec<Article>) -> SearchReport {
        SearchReport {
            query: "Shankara".to_string(),
            backend: Backend::Rss,
            locale: "IN".to_string(),
            local_date: "2026-10-16".to_string(),
            local_time: "09:30:00".to_string(),
            count: articles.len(),
            articles,
            error: None,
        }
    }

    #[test]
    fn test_render_dispatches_on_format() {
        let report = sample_report(vec![Article {
            title: "Shankara building products results".into(),
            link: "https://example.com/1".into(),
            ..Default::default()
        }]);

        assert!(render(&report, OutputFormat::Text).unwrap().starts_with("Found 1 article"));
        assert!(render(&report, OutputFormat::Markdown).unwrap().contains("### 1. Shankara"));
        assert!(render(&report, OutputFormat::Json).unwrap().trim_start().starts_with('{'));
    }

    #[tokio::test]
    async fn test_write_output_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.md");
        write_output(&path, "hello").await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "hello");
    }
}
