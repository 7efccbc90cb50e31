//! Locating document references in note text.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use paperlink_client::DocumentId;
use paperlink_config::BaseUrl;
use regex::Regex;
use url::Url;

/// Recognizes links into a specific Paperless installation.
///
/// Two URL shapes identify a document:
///
/// - `<base>/api/documents/<id>/preview`
/// - `<base>/documents/<id>/details`
///
/// The base URL is matched literally, so links to other servers (or other
/// paths on the same host) are ignored. Scheme and host compare without
/// regard to case, and the scheme's default port may be spelled out.
#[derive(Debug, Clone)]
pub struct ReferencePattern {
    regex: Regex,
}

impl ReferencePattern {
    pub fn new(base: &BaseUrl) -> Result<Self> {
        let pattern = format!(
            r"{}/(?:api/documents/(?P<preview>\d+)/preview|documents/(?P<details>\d+)/details)(?:$|[?#/)\]>\s])",
            base_pattern(base)?,
        );
        let regex = Regex::new(&pattern).or_raise(|| ErrorKind::Configuration)?;
        Ok(Self { regex })
    }

    /// Id of the first recognized link in `text`.
    pub fn extract(&self, text: &str) -> Option<DocumentId> {
        let captures = self.regex.captures(text)?;
        let digits = captures.name("preview").or_else(|| captures.name("details"))?;
        digits.as_str().parse().ok()
    }
}

/// Regex source for `base`, accepting the spellings that normalize to it.
fn base_pattern(base: &BaseUrl) -> Result<String> {
    let url = Url::parse(base.as_str()).or_raise(|| ErrorKind::Configuration)?;
    let Some(host) = url.host_str() else {
        exn::bail!(ErrorKind::Configuration);
    };
    let port = match (url.port(), url.port_or_known_default()) {
        (Some(port), _) => format!(":{port}"),
        (None, Some(default)) => format!("(?::{default})?"),
        (None, None) => String::new(),
    };
    Ok(format!(
        "(?i:{}://{}){port}{}",
        regex::escape(url.scheme()),
        regex::escape(host),
        regex::escape(url.path().trim_end_matches('/')),
    ))
}

/// Extracts a document id from a Paperless URL.
///
/// ```
/// use paperlink_config::BaseUrl;
/// use paperlink_library::reference::extract_document_id;
///
/// let base = BaseUrl::parse("https://dms.example.com").unwrap();
/// let id = extract_document_id("https://dms.example.com/api/documents/42/preview", &base);
/// assert_eq!(id.map(|id| id.get()), Some(42));
/// assert_eq!(extract_document_id("42", &base), None);
/// ```
pub fn extract_document_id(text: &str, base: &BaseUrl) -> Option<DocumentId> {
    ReferencePattern::new(base).ok()?.extract(text)
}

/// A whitespace-delimited token within a single line.
///
/// `start` and `end` are character (not byte) offsets; `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// The token touching character offset `ch` in `line`.
///
/// A cursor sitting directly before or directly after a token counts as being
/// on it. Returns `None` when the cursor is surrounded by whitespace.
pub fn word_at_cursor(line: &str, ch: usize) -> Option<Word> {
    let chars: Vec<char> = line.chars().collect();
    let ch = ch.min(chars.len());
    let mut start = ch;
    while start > 0 && !chars[start - 1].is_whitespace() {
        start -= 1;
    }
    let mut end = ch;
    while end < chars.len() && !chars[end].is_whitespace() {
        end += 1;
    }
    if start == end {
        return None;
    }
    Some(Word { start, end, text: chars[start..end].iter().collect() })
}
