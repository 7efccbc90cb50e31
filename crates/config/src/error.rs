//! Configuration Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// Every variant means "fix your settings": none of them are worth retrying,
/// and all of them should be reported before any request leaves the machine.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Explicitly requested configuration file does not exist.
    #[display("configuration file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// The configuration sources could not be merged into [`Settings`](crate::Settings).
    #[display("could not load configuration")]
    Load,
    /// Server URL is empty, unparseable, or not a plain http(s) base URL.
    #[display("invalid server URL: {_0:?}")]
    InvalidUrl(#[error(not(source))] String),
    /// No authentication token configured.
    #[display("missing authentication token")]
    MissingToken,
    /// Vault root is missing or not an absolute path.
    #[display("invalid vault path: {_0:?}")]
    InvalidVault(#[error(not(source))] Option<PathBuf>),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
