//! Link text templating.
//!
//! Renders the text inserted into a note from user-configured [upon]
//! templates. The syntax follows upon's Mustache-like conventions
//! (`{{ variable }}`, `{{ value|formatter }}`) with one extra formatter:
//!
//! - **`urlencode`**: percent-encodes a string so it can sit inside a
//!   Markdown link target.
//!
//! # Template Variables
//!
//! | Variable   | Type     | Description                                           |
//! |------------|----------|-------------------------------------------------------|
//! | `id`       | `String` | Document id                                           |
//! | `filename` | `String` | Local file name (`paperless-<id>.pdf`), or empty      |
//! | `path`     | `String` | Vault-relative path of the local file, or empty       |
//! | `url`      | `String` | Public share URL, or empty when not known             |
//! | `details`  | `String` | `<base>/documents/<id>/details` on the server         |
//!
//! # Example
//!
//! ```
//! use paperlink_library::{LinkTemplate, LinkVars};
//! use url::Url;
//!
//! let template: LinkTemplate = "[{{ id }}]({{ path|urlencode }})".parse().unwrap();
//! let vars = LinkVars {
//!     id: "42".to_string(),
//!     filename: "paperless-42.pdf".to_string(),
//!     path: "My Docs/paperless-42.pdf".to_string(),
//!     url: String::new(),
//!     details: Url::parse("https://dms.example.com/documents/42/details").unwrap(),
//! };
//! assert_eq!(template.render(&vars).unwrap(), "[42](My%20Docs%2Fpaperless-42.pdf)");
//! ```

use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use std::str::FromStr;
use upon::{Engine, Template};
use url::Url;

/// Text inserted for a document that was saved locally.
pub const DEFAULT_TEMPLATE_RESOLVED: &str = "![[{{ filename }}]]";
/// Text inserted when no share link could be obtained and the policy asks for
/// a fallback link.
pub const DEFAULT_TEMPLATE_UNRESOLVED: &str = "[{{ id }}]({{ details }})";

/// Values exposed to a [`LinkTemplate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkVars {
    pub id: String,
    pub filename: String,
    pub path: String,
    pub url: String,
    pub details: Url,
}

/// A compiled link template.
///
/// Constructed via [`FromStr`], which compiles eagerly so that syntax errors
/// surface when settings are loaded rather than halfway through an insert.
pub struct LinkTemplate {
    engine: Engine<'static>,
    template: Template<'static>,
}

impl FromStr for LinkTemplate {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let template = engine.compile(s.to_string()).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template })
    }
}

impl LinkTemplate {
    pub fn resolved_default() -> Result<Self> {
        DEFAULT_TEMPLATE_RESOLVED.parse()
    }

    pub fn unresolved_default() -> Result<Self> {
        DEFAULT_TEMPLATE_UNRESOLVED.parse()
    }

    /// Renders the template. Surrounding whitespace is trimmed so a template
    /// read from a multi-line config value doesn't add blank lines to notes.
    pub fn render(&self, vars: &LinkVars) -> Result<String> {
        let text = self
            .template
            .render(&self.engine, upon::value! {
                id: &vars.id,
                filename: &vars.filename,
                path: &vars.path,
                url: &vars.url,
                details: vars.details.as_str(),
            })
            .to_string()
            .or_raise(|| ErrorKind::Template)?;
        Ok(text.trim().to_string())
    }
}

/// Custom [`upon`] extensions for link-safe string manipulation.
mod addons {
    use std::fmt::Write;
    use upon::{Engine, Value, fmt as upon_fmt};

    /// Percent-encodes strings; other values render as usual.
    fn urlencode_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => write!(f, "{}", urlencoding::encode(s))?,
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("urlencode", urlencode_formatter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn vars() -> LinkVars {
        LinkVars {
            id: "42".to_string(),
            filename: "paperless-42.pdf".to_string(),
            path: "Paperless/paperless-42.pdf".to_string(),
            url: "https://dms.example.com/share/abc".to_string(),
            details: Url::parse("https://dms.example.com/documents/42/details").unwrap(),
        }
    }

    #[test]
    fn test_defaults() {
        assert_eq!(LinkTemplate::resolved_default().unwrap().render(&vars()).unwrap(), "![[paperless-42.pdf]]");
        assert_eq!(
            LinkTemplate::unresolved_default().unwrap().render(&vars()).unwrap(),
            "[42](https://dms.example.com/documents/42/details)"
        );
    }

    #[rstest]
    #[case("[[{{ path }}]]", "[[Paperless/paperless-42.pdf]]")]
    #[case("[Document {{ id }}]({{ url }})", "[Document 42](https://dms.example.com/share/abc)")]
    #[case("  ![[{{ filename }}]]\n", "![[paperless-42.pdf]]")]
    #[case("static text", "static text")]
    fn test_renders(#[case] template: &str, #[case] expected: &str) {
        let template: LinkTemplate = template.parse().unwrap();
        assert_eq!(template.render(&vars()).unwrap(), expected);
    }

    #[test]
    fn test_urlencode() {
        let template: LinkTemplate = "{{ path|urlencode }}".parse().unwrap();
        let mut vars = vars();
        vars.path = "Scans & Receipts/paperless-42.pdf".to_string();
        assert_eq!(template.render(&vars).unwrap(), "Scans%20%26%20Receipts%2Fpaperless-42.pdf");
    }

    #[test]
    fn test_invalid_syntax_fails_at_parse() {
        let err = "{{ filename".parse::<LinkTemplate>().err().unwrap();
        assert!(matches!(&*err, ErrorKind::Template));
    }

    #[test]
    fn test_unknown_variable_fails_at_render() {
        let template: LinkTemplate = "{{ nope }}".parse().unwrap();
        let err = template.render(&vars()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Template));
    }
}
