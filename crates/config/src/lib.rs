//! Configuration loading and validation.
//!
//! Settings are merged by [`figment`] from built-in defaults, an optional
//! configuration file, and `PAPERLINK_*` environment variables. Nothing here
//! talks to the network: validation problems are meant to be reported before
//! the first request is made.

pub mod error;
mod settings;
mod base_url;

pub use crate::settings::{DEFAULT_RETRIES, DEFAULT_TIMEOUT_SECS, ENV_PREFIX, OnUnresolved, Settings, default_path};
pub use crate::base_url::BaseUrl;
