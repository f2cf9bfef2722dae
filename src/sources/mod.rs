//! News sources a fetcher can search.
//!
//! Each source knows how to build its request URL and how to turn the
//! upstream response into [`Article`](crate::models::Article)s. Sources are
//! never combined; the configured [`Backend`](crate::models::Backend) picks one.
//!
//! | Source | Module | Format | Credentials |
//! |--------|--------|--------|-------------|
//! | Google News search | [`google_news`] | RSS 2.0 | none |
//! | NewsAPI everything | [`newsapi`] | JSON | API key |
//!
//! Both expose:
//! - `search_url(...)`: the exact URL requested
//! - `articles_from_body(body, ..., max_results)`: response mapping, no I/O
//! - `search(transport, options, ...)`: one GET plus mapping

pub mod google_news;
pub mod newsapi;
