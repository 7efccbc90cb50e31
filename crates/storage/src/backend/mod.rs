//! Storage backend trait and implementations.
//!
//! The editor only needs a narrow slice of a file store: check for a file,
//! create a folder, create a file exactly once, and read it back.

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Unified interface for storage backends.
///
/// All paths are relative to the backend root (the notes vault) and are
/// validated with [`validate_path`](crate::validate_path) by every
/// implementation.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use paperlink_storage::{backend::StorageBackend, error::Result};
///
/// async fn save_once(backend: &dyn StorageBackend, data: &[u8]) -> Result<bool> {
///     let path = Path::new("Paperless/paperless-42.pdf");
///     if backend.exists(path).await? {
///         return Ok(false);
///     }
///     backend.create_dir(Path::new("Paperless")).await?;
///     backend.create(path, data).await?;
///     Ok(true)
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend, used for logging only.
    fn name(&self) -> &str;

    /// Check if a file (or folder) exists.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Read file contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Create a new file with the given contents.
    ///
    /// Never overwrites: returns
    /// [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists) if something
    /// is already at `path`. Parent folders are created as needed. A failed
    /// write leaves no partial file behind.
    async fn create(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Create a folder (and its parents).
    ///
    /// Idempotent: a folder that already exists, including one created
    /// concurrently by someone else, is success. Returns
    /// [`NotADirectory`](crate::error::ErrorKind::NotADirectory) if a file is
    /// in the way.
    async fn create_dir(&self, path: &Path) -> Result<()>;
}
