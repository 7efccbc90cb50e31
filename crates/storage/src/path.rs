//! Path validation.
//!
//! Every path handed to a backend is relative to the vault root. Note folders
//! come straight out of user settings, so they are normalized here and kept
//! from climbing out of the vault.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Normalizes a vault-relative path, rejecting anything that would leave the
/// root (no `..` traversal past the top, no drive prefixes, no null bytes).
///
/// Leading `/` is ignored: note-taking apps happily store "/Attachments" to
/// mean the folder at the top of the vault.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use paperlink_storage::validate_path;
/// assert_eq!(validate_path("Paperless/paperless-42.pdf").unwrap(), Path::new("Paperless/paperless-42.pdf"));
/// assert_eq!(validate_path("/Attachments/./docs/").unwrap(), Path::new("Attachments/docs"));
/// assert!(validate_path("../outside.pdf").is_err());
/// assert!(validate_path("").is_err());
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    match normalize(path.as_ref())? {
        Some(normalized) => Ok(normalized),
        None => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
    }
}

/// Same rules as [`validate`], but a path that normalizes to the vault root
/// itself (`""`, `"."`, `"/"`) is accepted and returned as `None`.
///
/// ```
/// use std::path::Path;
/// use paperlink_storage::validate_folder;
/// assert_eq!(validate_folder("").unwrap(), None);
/// assert_eq!(validate_folder("./").unwrap(), None);
/// assert_eq!(validate_folder("Paperless/").unwrap().as_deref(), Some(Path::new("Paperless")));
/// assert!(validate_folder("a/../../b").is_err());
/// ```
pub fn validate_folder(path: impl AsRef<Path>) -> Result<Option<PathBuf>> {
    normalize(path.as_ref())
}

fn normalize(path: &Path) -> Result<Option<PathBuf>> {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
                }
            },
        }
    }
    match components.is_empty() {
        true => Ok(None),
        false => Ok(Some(components.into_iter().collect())),
    }
}
