//! Linking notes to documents on a Paperless server.
//!
//! The pipeline runs leaf-first: [`reference`] finds a document id in note
//! text, [`resolve`] obtains a permanent share link for it, [`materialize`]
//! downloads the file into the storage folder, and [`actions`] renders a
//! [`LinkTemplate`] into the note. [`listing`] and [`browse`] are the
//! independent read path used to pick a document by thumbnail.

pub mod actions;
pub mod browse;
pub mod error;
pub mod listing;
pub mod materialize;
pub mod notify;
pub mod reference;
pub mod resolve;
pub mod surface;
mod template;
#[cfg(test)]
mod testing;

pub use crate::template::{DEFAULT_TEMPLATE_RESOLVED, DEFAULT_TEMPLATE_UNRESOLVED, LinkTemplate, LinkVars};

use crate::error::{ErrorKind, Result};
use crate::resolve::RetryPolicy;
use exn::ResultExt;
use paperlink_config::{OnUnresolved, Settings};
use paperlink_storage::validate_folder;
use std::path::PathBuf;

/// Per-operation settings shared by the materializer and the actions.
pub struct Context {
    /// Storage folder relative to the backend root; `None` is the root itself.
    pub folder: Option<PathBuf>,
    pub retry: RetryPolicy,
    /// Link text for documents saved locally.
    pub template: LinkTemplate,
    /// Link text for documents that could not be saved.
    pub fallback: LinkTemplate,
    pub unresolved: OnUnresolved,
}

impl Context {
    /// Builds a context from settings, validating the storage folder and
    /// compiling the link template.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let folder = validate_folder(&settings.storage_path).or_raise(|| ErrorKind::Configuration)?;
        let template = match settings.link_template.as_deref().map(str::trim) {
            Some(template) if !template.is_empty() => template.parse()?,
            _ => LinkTemplate::resolved_default()?,
        };
        Ok(Self {
            folder,
            retry: RetryPolicy::from_settings(settings),
            template,
            fallback: LinkTemplate::unresolved_default()?,
            unresolved: settings.unresolved,
        })
    }
}
