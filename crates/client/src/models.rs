//! Wire types for the subset of the Paperless REST API we consume.
//!
//! Only the fields the editor actually uses are modelled; serde ignores the
//! rest, so newer server versions adding fields don't break anything.

use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use paperlink_config::BaseUrl;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use time::OffsetDateTime;
use url::Url;

/// Server-assigned document identifier.
///
/// Shows up as text in URLs and note references, and as a JSON number on the
/// wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(u64);

impl DocumentId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Web UI page for this document: `<base>/documents/<id>/details`.
    pub fn details_url(self, base: &BaseUrl) -> Result<Url> {
        base.join(&format!("/documents/{}/details", self.0)).or_raise(|| ErrorKind::Url)
    }
}

impl From<u64> for DocumentId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for DocumentId {
    type Err = Error;

    /// Accepts plain decimal digits only: no sign, no whitespace.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            exn::bail!(ErrorKind::InvalidDocumentId(s.to_string()));
        }
        s.parse::<u64>().map(Self).or_raise(|| ErrorKind::InvalidDocumentId(s.to_string()))
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// `GET /api/documents/`; only the `all` id list matters to us.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DocumentListing {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub all: Vec<DocumentId>,
}

/// `GET /api/documents/<id>/`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<u64>,
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub original_file_name: Option<String>,
}

/// A tag, as rendered in the browse view.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tag {
    pub id: u64,
    pub name: String,
    /// Background colour (`#rrggbb`).
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub text_color: Option<String>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    pub results: Vec<T>,
}

/// Which rendition of a document a share link hands out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileVersion {
    #[default]
    Original,
    Archive,
}

/// A share link record as returned by `GET /api/documents/<id>/share_links/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShareLink {
    #[serde(default)]
    pub id: Option<u64>,
    pub slug: String,
    #[serde(default)]
    pub document: Option<DocumentId>,
    #[serde(default)]
    pub file_version: Option<FileVersion>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expiration: Option<OffsetDateTime>,
}

impl ShareLink {
    /// Links without an expiration never go stale, so they're the ones worth
    /// reusing.
    pub fn is_permanent(&self) -> bool {
        self.expiration.is_none()
    }

    /// Public, unauthenticated URL serving the linked file: `<base>/share/<slug>`.
    pub fn url(&self, base: &BaseUrl) -> Result<Url> {
        base.join(&format!("/share/{}", self.slug)).or_raise(|| ErrorKind::Url)
    }
}

/// Body of `POST /api/share_links/`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateShareLink {
    pub document: DocumentId,
    pub file_version: FileVersion,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("42", 42)]
    #[case("0", 0)]
    #[case("007", 7)]
    fn test_document_id_parses(#[case] input: &str, #[case] expected: u64) {
        assert_eq!(input.parse::<DocumentId>().unwrap(), DocumentId::new(expected));
    }

    #[rstest]
    #[case("")]
    #[case("+42")]
    #[case(" 42")]
    #[case("4two")]
    #[case("99999999999999999999999")]
    fn test_document_id_rejects(#[case] input: &str) {
        let err = input.parse::<DocumentId>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidDocumentId(_)));
    }

    #[test]
    fn test_share_links_decode() {
        let json = r#"[
            {"id": 1, "created": "2024-01-01T10:00:00Z", "expiration": "2024-02-01T10:00:00Z", "slug": "expiring", "document": 42, "file_version": "archive"},
            {"id": 2, "created": "2024-01-02T10:00:00.123456+01:00", "expiration": null, "slug": "forever", "document": 42, "file_version": "original"}
        ]"#;
        let links: Vec<ShareLink> = serde_json::from_str(json).unwrap();
        assert_eq!(links.len(), 2);
        assert!(!links[0].is_permanent());
        assert_eq!(links[0].file_version, Some(FileVersion::Archive));
        assert!(links[1].is_permanent());
        assert_eq!(links[1].document, Some(DocumentId::new(42)));
    }

    #[test]
    fn test_share_link_url() {
        let base = BaseUrl::parse("https://dms.example.com/").unwrap();
        let link: ShareLink = serde_json::from_str(r#"{"slug": "abc123", "expiration": null}"#).unwrap();
        assert_eq!(link.url(&base).unwrap().as_str(), "https://dms.example.com/share/abc123");
    }

    #[test]
    fn test_details_url() {
        let base = BaseUrl::parse("https://dms.example.com/paperless").unwrap();
        let url = DocumentId::new(42).details_url(&base).unwrap();
        assert_eq!(url.as_str(), "https://dms.example.com/paperless/documents/42/details");
    }

    #[test]
    fn test_create_body() {
        let body = CreateShareLink { document: DocumentId::new(42), file_version: FileVersion::Original };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"document":42,"file_version":"original"}"#);
    }

    #[test]
    fn test_document_decode_ignores_unknown_fields() {
        let json = r#"{"id": 7, "title": "Invoice", "tags": [1, 3], "page_count": 2, "content": "lots of OCR text", "notes": []}"#;
        let document: Document = serde_json::from_str(json).unwrap();
        assert_eq!(document.id, DocumentId::new(7));
        assert_eq!(document.tags, vec![1, 3]);
        assert_eq!(document.page_count, Some(2));
        assert_eq!(document.original_file_name, None);
    }
}
