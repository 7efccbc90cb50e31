//! Authenticated access to a Paperless server.
//!
//! [`Client`] speaks HTTP; everything downstream depends only on the
//! [`DocumentApi`] trait so it can be driven without a server.

mod api;
mod client;
pub mod error;
pub mod models;

pub use crate::api::{ApiHandle, DocumentApi};
pub use crate::client::Client;
pub use crate::models::{Document, DocumentId, DocumentListing, ShareLink, Tag};
