//! In-memory storage backend for testing.

use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use crate::path::validate as validate_path;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

#[derive(Clone)]
enum Entry {
    File(Vec<u8>),
    Folder,
}

/// In-memory storage backend for testing.
///
/// Files and folders live in a `HashMap` behind a [`RwLock`], so all trait
/// methods can operate on `&self` without external synchronisation.
///
/// # Examples
///
/// ```
/// use paperlink_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([
///     ("Paperless/paperless-1.pdf", b"%PDF-1.7"),
/// ]);
/// assert!(backend.exists(Path::new("Paperless/paperless-1.pdf")).await?);
/// assert!(backend.exists(Path::new("Paperless")).await?);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    storage: RwLock<HashMap<PathBuf, Entry>>,
}

impl MockBackend {
    /// Create a mock backend pre-populated with files (parent folders are
    /// implied).
    ///
    /// Panics if any path fails validation. If test setup is wrong, then the
    /// test should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let mut map = HashMap::new();
        for (path, data) in files {
            let path = path.into();
            let Ok(validated) = validate_path(&path) else {
                // The panic here is DELIBERATE. MockBackend is intended to be
                // used in tests; panics are expected. There is no error result.
                panic!("MockBackend::with_files: invalid path {}", path.display());
            };
            Self::insert_parents(&mut map, &validated);
            map.insert(validated, Entry::File(data.into()));
        }
        Self {
            name: "mock".to_string(),
            storage: RwLock::new(map),
        }
    }

    /// Change the name of the mock backend.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Paths of every file currently stored, sorted.
    pub async fn files(&self) -> Vec<PathBuf> {
        let guard = self.storage.read().await;
        let mut files: Vec<_> =
            guard.iter().filter(|(_, entry)| matches!(entry, Entry::File(_))).map(|(path, _)| path.clone()).collect();
        files.sort();
        files
    }

    fn insert_parents(map: &mut HashMap<PathBuf, Entry>, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            map.entry(ancestor.to_path_buf()).or_insert(Entry::Folder);
        }
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &str); 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let path = validate_path(path)?;
        Ok(self.storage.read().await.contains_key(&path))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let path = validate_path(path)?;
        match self.storage.read().await.get(&path) {
            Some(Entry::File(data)) => Ok(data.clone()),
            _ => exn::bail!(ErrorKind::NotFound(path)),
        }
    }

    async fn create(&self, path: &Path, data: &[u8]) -> Result<()> {
        let path = validate_path(path)?;
        let mut guard = self.storage.write().await;
        if guard.contains_key(&path) {
            exn::bail!(ErrorKind::AlreadyExists(path));
        }
        for ancestor in path.ancestors().skip(1) {
            if let Some(Entry::File(_)) = guard.get(ancestor) {
                exn::bail!(ErrorKind::NotADirectory(ancestor.to_path_buf()));
            }
        }
        Self::insert_parents(&mut guard, &path);
        guard.insert(path, Entry::File(data.to_vec()));
        Ok(())
    }

    async fn create_dir(&self, path: &Path) -> Result<()> {
        let path = validate_path(path)?;
        let mut guard = self.storage.write().await;
        for ancestor in path.ancestors() {
            if let Some(Entry::File(_)) = guard.get(ancestor) {
                exn::bail!(ErrorKind::NotADirectory(ancestor.to_path_buf()));
            }
        }
        Self::insert_parents(&mut guard, &path);
        guard.insert(path, Entry::Folder);
        Ok(())
    }
}
