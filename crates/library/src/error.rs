//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Each variant names the subsystem a
//! failure came from; the inner frame (client, storage, config) stays in the
//! error tree for diagnostics.
//!
//! Note that "no share link could be obtained" is not an error anywhere in
//! this crate. It is an ordinary outcome
//! ([`Materialized::Unresolved`](crate::materialize::Materialized::Unresolved)).

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Settings are incomplete or invalid; nothing was sent to the server.
    #[display("invalid configuration")]
    Configuration,
    /// A request the operation could not do without failed.
    #[display("request to the document server failed")]
    Api,
    /// Reading or writing the local storage folder failed.
    #[display("storage operation failed")]
    Storage,
    /// A link template failed to compile or render.
    #[display("issue with link text generation from template")]
    Template,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Api | Self::Storage)
    }
}
