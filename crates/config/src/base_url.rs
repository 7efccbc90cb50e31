//! Validated server base URL.

use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use url::Url;

/// The root of a Paperless installation, e.g. `https://dms.example.com` or
/// `https://example.com/paperless`.
///
/// Stored without a trailing slash so that API paths (which always start with
/// `/`) can be appended verbatim, and so that reference extraction can match
/// the configured URL literally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Parses and normalizes a base URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use paperlink_config::BaseUrl;
    ///
    /// let base = BaseUrl::parse("https://dms.example.com/").unwrap();
    /// assert_eq!(base.as_str(), "https://dms.example.com");
    /// assert!(BaseUrl::parse("dms.example.com").is_err());
    /// assert!(BaseUrl::parse("https://dms.example.com/?x=1").is_err());
    /// ```
    pub fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref().trim();
        let invalid = || ErrorKind::InvalidUrl(input.to_string());
        let url = Url::parse(input).or_raise(invalid)?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            exn::bail!(invalid());
        }
        if url.query().is_some() || url.fragment().is_some() || url.cannot_be_a_base() {
            exn::bail!(invalid());
        }
        Ok(Self(url.as_str().trim_end_matches('/').to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends an absolute API path (`/api/...`) to the base.
    pub fn join(&self, path: &str) -> Result<Url> {
        let joined = format!("{}/{}", self.0, path.trim_start_matches('/'));
        Url::parse(&joined).or_raise(|| ErrorKind::InvalidUrl(joined.clone()))
    }
}

impl FromStr for BaseUrl {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for BaseUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
