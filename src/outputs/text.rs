//! Plain-text output for the terminal.

use crate::models::SearchReport;
use std::fmt::Write;

/// Numbered list: title, then an indented line with time/publisher and link.
///
/// Summaries are left out here; they often carry HTML that reads badly in a
/// terminal. Use the Markdown or JSON formats to get them.
pub fn report_to_text(report: &SearchReport) -> String {
    let mut out = String::new();
    if let Some(error) = &report.error {
        writeln!(out, "Search failed: {error}").unwrap();
        return out;
    }
    if report.articles.is_empty() {
        writeln!(out, "No news articles found.").unwrap();
        return out;
    }

    let noun = if report.articles.len() == 1 { "article" } else { "articles" };
    writeln!(out, "Found {} {noun} for \"{}\".\n", report.articles.len(), report.query).unwrap();
    let width = report.articles.len().to_string().len();
    for (i, article) in report.articles.iter().enumerate() {
        writeln!(out, "{:>width$}. {}", i + 1, article.title).unwrap();
        let meta: Vec<&str> = [article.published.as_str(), article.source.as_deref().unwrap_or("")]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        let pad = " ".repeat(width + 2);
        if !meta.is_empty() {
            writeln!(out, "{pad}{}", meta.join(" | ")).unwrap();
        }
        if !article.link.is_empty() {
            writeln!(out, "{pad}{}", article.link).unwrap();
        }
    }
    out
}
