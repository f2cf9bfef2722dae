//! JSON output.
//!
//! The whole [`SearchReport`] is serialized, so consumers get the query,
//! backend, locale and timestamp next to the articles:
//!
//! ```json
//! {"query": "Tesla", "backend": "rss", "locale": "IN",
//!  "local_date": "2026-10-16", "local_time": "09:30:00",
//!  "count": 1, "articles": [{"title": "...", "link": "...", "published": "...", "summary": "..."}]}
//! ```

use crate::models::SearchReport;

/// Serialize a report as pretty-printed JSON.
pub fn report_to_json(report: &SearchReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, Backend};

    #[test]
    fn test_report_round_trips() {
        let report = SearchReport {
            query: "Tesla".into(),
            backend: Backend::Api,
            locale: "en".into(),
            local_date: "2026-10-16".into(),
            local_time: "09:30:00".into(),
            count: 1,
            articles: vec![Article {
                title: "Tesla deliveries beat".into(),
                link: "https://example.com/1".into(),
                published: "2026-10-12T07:00:00Z".into(),
                summary: "Deliveries rose.".into(),
                source: Some("Reuters".into()),
            }],
            error: None,
        };

        let json = report_to_json(&report).unwrap();
        assert!(json.contains(r#""backend": "api""#));
        assert!(!json.contains("\"error\""));

        let back: SearchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
