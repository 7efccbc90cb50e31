//! Local filesystem storage backend.
//!
//! Files are stored under a vault directory and accessed via `tokio::fs`.

use crate::error::ErrorKind;
use crate::{StorageBackend, error::Result, path::validate as validate_path};
use async_trait::async_trait;
use std::fs::create_dir_all as sync_create_dir;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Local filesystem storage backend.
///
/// # Examples
///
/// ```no_run
/// use paperlink_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("vault", "/home/me/Notes")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalBackend {
    name: String,
    /// Vault root
    root: PathBuf,
}
impl LocalBackend {
    /// Create a new local filesystem backend rooted at an absolute path.
    ///
    /// The root is created if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute or is not a directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::NotADirectory(root));
            }
        } else {
            // Use non-async here; it'll only happen once on startup and it's
            // not worth the hassle of making the constructor async.
            sync_create_dir(&root).map_err(|e| Self::map_io_error(e, &root))?;
        }

        Ok(Self { name: name.into(), root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates the path and joins it with the root directory.
    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            std::io::ErrorKind::AlreadyExists => ErrorKind::AlreadyExists(path.to_path_buf()),
            std::io::ErrorKind::NotADirectory => ErrorKind::NotADirectory(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::try_exists(&abs_path).await.map_err(ErrorKind::Io)?)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::read(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn create(&self, path: &Path, data: &[u8]) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        if let Some(parent) = abs_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Self::map_io_error(e, path))?;
        }
        // `create_new` makes the existence check and the creation one atomic
        // step, so two writers racing for the same document can't clobber
        // each other.
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&abs_path)
            .await
            .map_err(|e| Self::map_io_error(e, path))?;
        let written = async {
            file.write_all(data).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;
        if let Err(e) = written {
            drop(file);
            if let Err(cleanup) = fs::remove_file(&abs_path).await {
                tracing::warn!(path = %abs_path.display(), error = %cleanup, "Could not remove partially written file");
            }
            return Err(Self::map_io_error(e, path).into());
        }
        Ok(())
    }

    async fn create_dir(&self, path: &Path) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        let Err(e) = fs::create_dir_all(&abs_path).await else {
            return Ok(());
        };
        // Lost a race with another creator: fine, as long as it's a folder.
        if fs::metadata(&abs_path).await.is_ok_and(|m| m.is_dir()) {
            return Ok(());
        }
        match e.kind() {
            std::io::ErrorKind::AlreadyExists => exn::bail!(ErrorKind::NotADirectory(path.to_path_buf())),
            _ => Err(Self::map_io_error(e, path).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    use super::*;

    #[test]
    fn test_new_requires_absolute_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(LocalBackend::new("vault", temp_dir.path()).is_ok());
        assert!(LocalBackend::new("vault", "relative/path").is_err());
        assert!(LocalBackend::new("vault", "./relative").is_err());
    }

    #[test]
    fn test_new_creates_missing_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("new/vault");
        LocalBackend::new("vault", &root).unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_absolute_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("vault", temp_dir.path()).unwrap();
        let expected = temp_dir.path().join("Paperless/paperless-1.pdf");
        assert_eq!(backend.absolute_path(Path::new("Paperless/paperless-1.pdf")).unwrap(), expected);
        assert!(backend.absolute_path(Path::new("../etc/passwd")).is_err());
    }

    #[tokio::test]
    async fn test_create_and_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("vault", temp_dir.path()).unwrap();
        backend.create(Path::new("Paperless/paperless-1.pdf"), b"%PDF-1.7").await.unwrap();
        assert_eq!(backend.read(Path::new("Paperless/paperless-1.pdf")).await.unwrap(), b"%PDF-1.7");
    }

    #[tokio::test]
    async fn test_create_never_overwrites() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("vault", temp_dir.path()).unwrap();
        backend.create(Path::new("doc.pdf"), b"first").await.unwrap();
        let err = backend.create(Path::new("doc.pdf"), b"second").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(_)));
        assert_eq!(backend.read(Path::new("doc.pdf")).await.unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_exists() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("vault", temp_dir.path()).unwrap();
        assert!(!backend.exists(Path::new("nonexistent.pdf")).await.unwrap());
        backend.create(Path::new("exists.pdf"), b"data").await.unwrap();
        assert!(backend.exists(Path::new("exists.pdf")).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_dir_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("vault", temp_dir.path()).unwrap();
        backend.create_dir(Path::new("Attachments/Paperless")).await.unwrap();
        backend.create_dir(Path::new("Attachments/Paperless")).await.unwrap();
        assert!(temp_dir.path().join("Attachments/Paperless").is_dir());
    }

    #[tokio::test]
    async fn test_create_dir_blocked_by_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("vault", temp_dir.path()).unwrap();
        backend.create(Path::new("Paperless"), b"not a folder").await.unwrap();
        let err = backend.create_dir(Path::new("Paperless")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotADirectory(_)));
    }

    #[tokio::test]
    async fn test_concurrent_create_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("vault", temp_dir.path()).unwrap();
        let (a, b) = tokio::join!(
            backend.create_dir(Path::new("Paperless")),
            backend.create_dir(Path::new("Paperless"))
        );
        a.unwrap();
        b.unwrap();
    }

    #[tokio::test]
    async fn test_read_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("vault", temp_dir.path()).unwrap();
        let err = backend.read(Path::new("missing.pdf")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_path_security() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("vault", temp_dir.path()).unwrap();
        assert!(backend.read(Path::new("../etc/passwd")).await.is_err());
        assert!(backend.create(Path::new("../escape.pdf"), b"data").await.is_err());
        assert!(backend.create_dir(Path::new("../../outside")).await.is_err());
    }
}
