//! Client Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Every variant here is a transport
//! error in the broad sense: the request did not produce the answer we
//! wanted, and the caller decides whether that matters.

use derive_more::{Display, Error};

/// A client error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The server answered with a non-success status. The raw body is kept
    /// for diagnostics (Paperless puts its validation messages there).
    #[display("server responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The request never got a response (DNS, TLS, connection reset, timeout).
    #[display("network error")]
    Network,
    /// The response arrived but didn't look like what the endpoint promises.
    #[display("unexpected response body")]
    Decode,
    /// A request URL could not be built from the configured base URL.
    #[display("invalid request URL")]
    Url,
    /// The token can't be sent as an HTTP header value.
    #[display("authentication token contains invalid characters")]
    InvalidToken,
    /// Text that was supposed to be a document id isn't one.
    #[display("invalid document id: {_0:?}")]
    InvalidDocumentId(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// HTTP status code, if the server got as far as answering.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorKind::Network, true)]
    #[case(ErrorKind::Status { status: 503, body: String::new() }, true)]
    #[case(ErrorKind::Status { status: 429, body: String::new() }, true)]
    #[case(ErrorKind::Status { status: 404, body: String::new() }, false)]
    #[case(ErrorKind::Status { status: 401, body: String::new() }, false)]
    #[case(ErrorKind::Decode, false)]
    #[case(ErrorKind::InvalidToken, false)]
    fn test_retryable(#[case] kind: ErrorKind, #[case] expected: bool) {
        assert_eq!(kind.is_retryable(), expected);
    }

    #[test]
    fn test_status_display_keeps_body() {
        let kind = ErrorKind::Status { status: 400, body: "{\"document\":[\"Invalid pk\"]}".to_string() };
        assert_eq!(kind.to_string(), "server responded with HTTP 400: {\"document\":[\"Invalid pk\"]}");
        assert_eq!(kind.status(), Some(400));
        assert_eq!(ErrorKind::Network.status(), None);
    }
}
