//! Utility functions for text decoding, query shaping and log hygiene.
//!
//! - Lossy decoding under the declared text encoding, reporting dropped bytes
//! - Single-token detection for search expansion
//! - String truncation and API key redaction for logging

use encoding_rs::{DecoderResult, Encoding, UTF_8};
use tracing::{debug, warn};

/// How far into a body to look for an `<?xml ... encoding="..."?>` declaration.
const XML_DECL_SCAN_LIMIT: usize = 1024;

/// Text produced by [`decode_lossy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    /// Number of bytes that were invalid under `encoding` and were left out.
    pub dropped_bytes: usize,
    pub encoding: &'static Encoding,
}

/// Pull the `charset` parameter out of a `Content-Type` header value.
///
/// ```ignore
/// assert_eq!(charset_param("text/xml; charset=\"ISO-8859-1\""), Some("ISO-8859-1".into()));
/// ```
pub fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c: char| c == '"' || c == '\'').to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Encoding named by a leading `<?xml ... encoding="..."?>` declaration.
///
/// A declaration that could be read as ASCII cannot really be UTF-16, so
/// labels without an ASCII-compatible form map to UTF-8.
fn xml_declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = bytes[..bytes.len().min(XML_DECL_SCAN_LIMIT)].trim_ascii_start();
    if !head.starts_with(b"<?xml") {
        return None;
    }
    let decl = &head[..head.windows(2).position(|w| w == b"?>")?];
    let at = decl.windows(8).position(|w| w == b"encoding")?;
    let rest = decl[at + 8..].trim_ascii_start().strip_prefix(b"=")?.trim_ascii_start();
    let (&quote, value) = rest.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let label = &value[..value.iter().position(|&b| b == quote)?];
    Encoding::for_label(label).map(Encoding::output_encoding)
}

/// Decode a response body, discarding byte sequences that are invalid under
/// its text encoding.
///
/// The encoding is taken from, in order: a byte order mark, the transport's
/// `charset`, the XML declaration, and finally UTF-8. Unlike the replacement
/// decoders nothing is substituted for bad bytes: they are skipped entirely so
/// that a stray byte inside an element does not leave replacement characters
/// in titles.
///
/// # Arguments
///
/// * `bytes` - The raw body
/// * `charset` - The `charset` parameter of the response's `Content-Type`, if any
///
/// # Returns
///
/// The decoded text, how many bytes were dropped, and the encoding used.
///
/// # Examples
///
/// ```ignore
/// let d = decode_lossy(b"caf\xC3\xA9 \xFFok", None);
/// assert_eq!(d.text, "café ok");
/// assert_eq!(d.dropped_bytes, 1);
/// ```
pub fn decode_lossy(bytes: &[u8], charset: Option<&str>) -> Decoded {
    let (encoding, bytes) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => {
            let declared = charset
                .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
                .or_else(|| xml_declared_encoding(bytes));
            (declared.unwrap_or(UTF_8), bytes)
        }
    };

    let mut decoder = encoding.new_decoder_without_bom_handling();
    let mut text = String::with_capacity(
        decoder
            .max_utf8_buffer_length_without_replacement(bytes.len())
            .unwrap_or(bytes.len()),
    );
    let mut dropped_bytes = 0usize;
    let mut read_total = 0usize;
    loop {
        let (result, read) =
            decoder.decode_to_string_without_replacement(&bytes[read_total..], &mut text, true);
        read_total += read;
        match result {
            DecoderResult::InputEmpty => break,
            DecoderResult::Malformed(bad, _) => dropped_bytes += usize::from(bad),
            DecoderResult::OutputFull => text.reserve(
                decoder
                    .max_utf8_buffer_length_without_replacement(bytes.len() - read_total)
                    .unwrap_or(bytes.len() - read_total)
                    .max(4),
            ),
        }
    }

    if dropped_bytes > 0 {
        warn!(
            dropped_bytes,
            total_bytes = bytes.len(),
            encoding = encoding.name(),
            "Dropped invalid bytes while decoding"
        );
    } else {
        debug!(total_bytes = bytes.len(), encoding = encoding.name(), "Decoded body without loss");
    }
    Decoded {
        text,
        dropped_bytes,
        encoding,
    }
}

/// `true` when the query is one word, i.e. contains no whitespace at all.
pub fn is_single_token(query: &str) -> bool {
    !query.is_empty() && !query.chars().any(char::is_whitespace)
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at `max` bytes (backing off to a char boundary) with
/// an ellipsis and byte count appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Replace the value of an `apiKey` query parameter with `***`.
pub fn redact_api_key(url: &str) -> String {
    let Some(start) = url.find("apiKey=") else {
        return url.to_string();
    };
    let value_start = start + "apiKey=".len();
    let value_end = url[value_start..]
        .find('&')
        .map(|i| value_start + i)
        .unwrap_or(url.len());
    format!("{}***{}", &url[..value_start], &url[value_end..])
}
