//! Markdown output.
//!
//! Each article becomes a numbered heading, an optional caption with the
//! publish time (and publisher, when known), the summary as-is, and a link:
//!
//! ```text
//! ### 1. Headline
//! *Mon, 12 Oct 2026 07:00:00 GMT · Reuters*
//!
//! Summary, possibly with inline HTML
//!
//! [Read full article](https://...)
//!
//! ---
//! ```
//!
//! Summaries are not escaped; feed HTML is passed through for the Markdown
//! renderer to deal with.

use crate::models::SearchReport;
use std::fmt::Write;

pub fn report_to_markdown(report: &SearchReport) -> String {
    let mut md = String::new();
    writeln!(md, "# News for \"{}\" ({})\n", report.query, report.locale).unwrap();

    if let Some(error) = &report.error {
        writeln!(md, "> **Search failed:** {error}").unwrap();
        return md;
    }
    if report.articles.is_empty() {
        writeln!(md, "No news articles found.").unwrap();
        return md;
    }

    writeln!(md, "Found {} articles.\n", report.articles.len()).unwrap();
    for (i, article) in report.articles.iter().enumerate() {
        writeln!(md, "### {}. {}", i + 1, article.title).unwrap();

        let caption: Vec<&str> = [Some(article.published.as_str()), article.source.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if !caption.is_empty() {
            writeln!(md, "*{}*", caption.join(" · ")).unwrap();
        }
        if !article.summary.is_empty() {
            writeln!(md, "\n{}", article.summary).unwrap();
        }
        if !article.link.is_empty() {
            writeln!(md, "\n[Read full article]({})", article.link).unwrap();
        }
        writeln!(md, "\n---\n").unwrap();
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Article;
    use crate::outputs::tests::sample_report;

    #[test]
    fn test_articles_are_numbered_with_links() {
        let report = sample_report(vec![
            Article {
                title: "First".into(),
                link: "https://example.com/1".into(),
                published: "Mon, 12 Oct 2026 07:00:00 GMT".into(),
                summary: "<b>bold</b> summary".into(),
                source: None,
            },
            Article {
                title: "Second".into(),
                link: "https://example.com/2".into(),
                source: Some("Reuters".into()),
                ..Default::default()
            },
        ]);
        let md = report_to_markdown(&report);

        assert!(md.contains("Found 2 articles."));
        assert!(md.contains("### 1. First\n*Mon, 12 Oct 2026 07:00:00 GMT*"));
        assert!(md.contains("<b>bold</b> summary"));
        assert!(md.contains("[Read full article](https://example.com/1)"));
        assert!(md.contains("### 2. Second\n*Reuters*"));
    }

    #[test]
    fn test_empty_and_failed_reports() {
        let md = report_to_markdown(&sample_report(Vec::new()));
        assert!(md.contains("No news articles found."));

        let mut failed = sample_report(Vec::new());
        failed.error = Some("Network error: timed out".into());
        let md = report_to_markdown(&failed);
        assert!(md.contains("**Search failed:** Network error: timed out"));
        assert!(!md.contains("No news articles found."));
    }
}
