//! Saving documents into the storage folder.
//!
//! Every document maps to exactly one file, `paperless-<id>.pdf`, directly
//! inside the storage folder. The file's existence is the only record that a
//! document was fetched: nothing else is cached, and an existing file is
//! never touched again.

use crate::Context;
use crate::error::{ErrorKind, Result};
use crate::resolve::{ResolvedLink, resolve_share_link};
use exn::ResultExt;
use paperlink_client::{ApiHandle, DocumentId};
use paperlink_storage::BackendHandle;
use paperlink_storage::error::ErrorKind as StorageErrorKind;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Name of the local file for a document.
pub fn filename(id: DocumentId) -> String {
    format!("paperless-{id}.pdf")
}

/// Where a document lives locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalReference {
    /// Path relative to the storage backend root (the vault).
    pub path: PathBuf,
    pub filename: String,
}

impl LocalReference {
    pub fn new(folder: Option<&Path>, id: DocumentId) -> Self {
        let filename = filename(id);
        let path = match folder {
            Some(folder) => folder.join(&filename),
            None => PathBuf::from(&filename),
        };
        Self { path, filename }
    }

    /// The path with `/` separators, as notes expect regardless of platform.
    pub fn link_path(&self) -> String {
        self.path.iter().map(|part| part.to_string_lossy()).collect::<Vec<_>>().join("/")
    }
}

/// The outcome of [`materialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Materialized {
    /// The file was already there; nothing was fetched.
    Existing(LocalReference),
    /// The file was downloaded through the given share link.
    Downloaded(LocalReference, ResolvedLink),
    /// No share link became available; no file was written.
    Unresolved,
}

impl Materialized {
    pub fn reference(&self) -> Option<&LocalReference> {
        match self {
            Self::Existing(reference) | Self::Downloaded(reference, _) => Some(reference),
            Self::Unresolved => None,
        }
    }

    pub fn link(&self) -> Option<&ResolvedLink> {
        match self {
            Self::Downloaded(_, link) => Some(link),
            _ => None,
        }
    }
}

/// Makes sure document `id` exists in the storage folder.
///
/// An existing file short-circuits before any request is made. Otherwise a
/// share link is resolved, the bytes are downloaded and the file is created.
/// If someone else creates the file in the meantime, theirs is kept and
/// reported as [`Materialized::Existing`].
///
/// # Errors
/// [`ErrorKind::Storage`] when the folder or file cannot be created, and
/// [`ErrorKind::Api`] when the download itself fails. Failing to obtain a
/// share link is not an error.
#[instrument(skip(api, backend, ctx), fields(document = %id))]
pub async fn materialize(
    api: &ApiHandle,
    backend: &BackendHandle,
    ctx: &Context,
    id: DocumentId,
) -> Result<Materialized> {
    if let Some(folder) = ctx.folder.as_deref() {
        backend.create_dir(folder).await.or_raise(|| ErrorKind::Storage)?;
    }

    let reference = LocalReference::new(ctx.folder.as_deref(), id);
    if backend.exists(&reference.path).await.or_raise(|| ErrorKind::Storage)? {
        tracing::debug!(path = %reference.path.display(), "Document already saved");
        return Ok(Materialized::Existing(reference));
    }

    let Some(link) = resolve_share_link(api, id, &ctx.retry).await else {
        return Ok(Materialized::Unresolved);
    };

    let bytes = api.download(&link.url).await.or_raise(|| ErrorKind::Api)?;
    match backend.create(&reference.path, &bytes).await {
        Ok(()) => {
            tracing::info!(path = %reference.path.display(), bytes = bytes.len(), "Saved document");
            Ok(Materialized::Downloaded(reference, link))
        },
        Err(e) if matches!(e.deref(), StorageErrorKind::AlreadyExists(_)) => {
            tracing::debug!(path = %reference.path.display(), "Document saved concurrently; keeping existing file");
            Ok(Materialized::Existing(reference))
        },
        Err(e) => Err(e).or_raise(|| ErrorKind::Storage),
    }
}
