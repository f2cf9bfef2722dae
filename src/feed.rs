//! Tolerant RSS / Atom parsing.
//!
//! News feeds in the wild are frequently broken: truncated bodies, stray
//! markup inside descriptions, mismatched tags. [`parse_feed`] never fails.
//! It walks the document with a streaming [`quick_xml::Reader`], keeps every
//! entry that was closed before things went wrong, and reports the problem in
//! [`ParsedFeed::malformed`] instead of discarding the whole document.
//!
//! Supported shapes:
//!
//! | Format | Root | Entry | Link | Published | Summary |
//! |--------|------|-------|------|-----------|---------|
//! | RSS 2.0 | `<rss>` | `<item>` | `<link>` text | `<pubDate>` | `<description>` |
//! | RSS 1.0 | `<rdf:RDF>` | `<item>` | `<link>` text | `<dc:date>` | `<description>` |
//! | Atom | `<feed>` | `<entry>` | `<link href>` | `<published>` / `<updated>` | `<summary>` / `<content>` |

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, instrument};

/// One raw entry, fields as found in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<String>,
    pub summary: Option<String>,
}

/// Entries recovered from a document, plus the reason it is considered
/// malformed, if it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    pub entries: Vec<FeedEntry>,
    pub malformed: Option<String>,
}

const PUBLISHED_TAGS: [&str; 4] = ["pubDate", "published", "updated", "dc:date"];
const SUMMARY_TAGS: [&str; 4] = ["description", "summary", "content:encoded", "content"];

/// Accumulates the children of one `<item>` / `<entry>`.
#[derive(Debug, Default)]
struct EntryBuilder {
    /// Depth of the entry element on the open-element stack.
    depth: usize,
    fields: Vec<(String, String)>,
    /// `(rel, href)` pairs from Atom `<link>` elements.
    links: Vec<(Option<String>, String)>,
    open_field: Option<String>,
    text: String,
}

impl EntryBuilder {
    fn first(&self, tag: &str) -> Option<String> {
        self.fields
            .iter()
            .find(|(name, value)| name == tag && !value.is_empty())
            .map(|(_, value)| value.clone())
    }

    fn first_of(&self, tags: &[&str]) -> Option<String> {
        tags.iter().find_map(|tag| self.first(tag))
    }

    fn atom_link(&self) -> Option<String> {
        self.links
            .iter()
            .find(|(rel, _)| matches!(rel.as_deref(), None | Some("alternate")))
            .or_else(|| self.links.first())
            .map(|(_, href)| href.clone())
    }

    fn build(self) -> FeedEntry {
        FeedEntry {
            title: self.first("title"),
            link: self.first("link").or_else(|| self.atom_link()),
            published: self.first_of(&PUBLISHED_TAGS),
            summary: self.first_of(&SUMMARY_TAGS),
        }
    }
}

fn qualified_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn is_entry(local: &str) -> bool {
    local == "item" || local == "entry"
}

fn is_feed_root(local: &str) -> bool {
    matches!(local, "rss" | "feed" | "RDF")
}

/// Pull `rel` and `href` off a `<link>` element, if it has an `href`.
fn link_attrs(e: &BytesStart<'_>) -> Option<(Option<String>, String)> {
    let mut rel = None;
    let mut href = None;
    for attr in e.attributes().flatten() {
        let value = attr
            .unescape_value()
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
        match attr.key.into_inner() {
            b"rel" => rel = Some(value),
            b"href" => href = Some(value),
            _ => {}
        }
    }
    href.filter(|h| !h.is_empty()).map(|h| (rel, h))
}

/// Parse an RSS or Atom document, recovering as many entries as possible.
///
/// # Arguments
///
/// * `xml` - The already decoded document
///
/// # Returns
///
/// Entries in document order, plus a reason in [`ParsedFeed::malformed`] when
/// the document is not well-formed XML or has no RSS / Atom root. An entry
/// that was still open when the document broke off is dropped.
#[instrument(level = "debug", skip_all, fields(bytes = xml.len()))]
pub fn parse_feed(xml: &str) -> ParsedFeed {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parsed = ParsedFeed::default();
    let mut stack: Vec<String> = Vec::new();
    let mut saw_root = false;
    let mut current: Option<EntryBuilder> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = qualified_name(&e);
                let local = local_name(&e);
                stack.push(name.clone());
                if stack.len() == 1 && is_feed_root(&local) {
                    saw_root = true;
                }

                if current.is_none() {
                    if is_entry(&local) {
                        current = Some(EntryBuilder {
                            depth: stack.len(),
                            ..Default::default()
                        });
                    }
                } else if let Some(entry) = current.as_mut() {
                    if stack.len() == entry.depth + 1 {
                        if local == "link" {
                            if let Some(link) = link_attrs(&e) {
                                entry.links.push(link);
                            }
                        }
                        entry.open_field = Some(name);
                        entry.text.clear();
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                if stack.is_empty() && is_feed_root(&local_name(&e)) {
                    saw_root = true;
                }
                if let Some(entry) = current.as_mut() {
                    if stack.len() == entry.depth && local_name(&e) == "link" {
                        if let Some(link) = link_attrs(&e) {
                            entry.links.push(link);
                        }
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(entry) = current.as_mut() {
                    if entry.open_field.is_some() {
                        // Unknown entities such as &nbsp; are kept verbatim.
                        match e.unescape() {
                            Ok(text) => entry.text.push_str(&text),
                            Err(_) => entry.text.push_str(&String::from_utf8_lossy(&e)),
                        }
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(entry) = current.as_mut() {
                    if entry.open_field.is_some() {
                        entry.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                    }
                }
            }
            Ok(Event::End(_)) => {
                let depth = stack.len();
                stack.pop();
                let entry_depth = current.as_ref().map(|entry| entry.depth);
                if entry_depth == Some(depth) {
                    if let Some(done) = current.take() {
                        parsed.entries.push(done.build());
                    }
                } else if let Some(entry) = current.as_mut() {
                    if depth == entry.depth + 1 {
                        if let Some(field) = entry.open_field.take() {
                            let text = std::mem::take(&mut entry.text);
                            entry.fields.push((field, text.trim().to_string()));
                        }
                    }
                }
            }
            Ok(Event::Eof) => {
                if let Some(open) = stack.last() {
                    parsed.malformed = Some(format!("document ended with unclosed <{open}>"));
                } else if !saw_root {
                    parsed.malformed = Some("no RSS or Atom root element".to_string());
                }
                break;
            }
            Err(e) => {
                parsed.malformed = Some(format!(
                    "XML error at byte {}: {e}",
                    reader.buffer_position()
                ));
                break;
            }
            _ => {}
        }
    }

    debug!(
        entries = parsed.entries.len(),
        malformed = ?parsed.malformed,
        "Parsed feed"
    );
    parsed
}
