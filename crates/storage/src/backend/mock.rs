//! In-memory storage backend for testing.

use super::FileInfoStream;
use crate::error::{ErrorKind, Result};
use crate::file::FileInfo;
use crate::path::validate as validate_path;
use async_stream::stream;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::StorageBackend;

/// In-memory storage backend for testing.
///
/// Files are stored in a `BTreeMap` behind a [`RwLock`], so all trait methods
/// can operate on `&self` without external synchronisation and listings come
/// back in a deterministic order. Ideal for unit tests that need a
/// [`StorageBackend`] without touching the filesystem.
///
/// # Examples
///
/// ```
/// use hemwatch_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([
///     ("items/women/blazers/allure-blazer.json", b"{}"),
/// ]);
/// assert!(backend.exists(Path::new("items/women/blazers/allure-blazer.json")).await?);
///
/// backend.append(Path::new("items/women/blazers/price_allure-blazer.csv"), b"100,t0,39.9\n").await?;
/// assert!(backend.exists(Path::new("items/women/blazers/price_allure-blazer.csv")).await?);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    storage: RwLock<BTreeMap<PathBuf, (OffsetDateTime, Vec<u8>)>>,
}

impl MockBackend {
    /// Create a mock backend pre-populated with files.
    ///
    /// Panics if any path fails validation (e.g. path traversal). If test
    /// setup is wrong, then test should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let mut map = BTreeMap::new();
        let now = OffsetDateTime::now_utc();
        for (path, data) in files {
            let path = path.into();
            let Ok(validated) = validate_path(&path) else {
                // The panic here is DELIBERATE. MockBackend is intended to be
                // used in tests; panics are expected. There is no error result.
                panic!("MockBackend::with_files: invalid path {}", path.display());
            };
            map.insert(validated, (now, data.into()));
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

    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a> {
        let validated_prefix = match prefix.map(validate_path).transpose() {
            Ok(pfx) => pfx,
            Err(e) => return Box::pin(futures::stream::once(async { Err(e) })),
        };

        Box::pin(stream! {
            // Snapshot matching entries under the read lock, then drop it
            // before yielding to avoid holding the lock across yield points.
            let entries: Vec<(PathBuf, (OffsetDateTime, u64))> = {
                let guard = self.storage.read().await;
                guard
                    .iter()
                    .filter(|(path, _)| match &validated_prefix {
                        Some(pfx) => path.starts_with(pfx),
                        None => true,
                    })
                    .map(|(path, (inserted, data))| (path.clone(), (*inserted, data.len() as u64)))
                    .collect()
            };
            for (path, (inserted, size)) in entries {
                yield Ok(FileInfo::new(path, size, inserted));
            }
        })
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let path = validate_path(path)?;
        Ok(self.storage.read().await.contains_key(&path))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let path = validate_path(path)?;
        let (_inserted, data) =
            self.storage.read().await.get(&path).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path)))?;
        Ok(data)
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let path = validate_path(path)?;
        self.storage.write().await.insert(path, (OffsetDateTime::now_utc(), data.to_vec()));
        Ok(())
    }

    async fn append(&self, path: &Path, data: &[u8]) -> Result<()> {
        let path = validate_path(path)?;
        let mut guard = self.storage.write().await;
        match guard.get_mut(&path) {
            Some((_inserted, existing)) => existing.extend_from_slice(data),
            None => {
                guard.insert(path, (OffsetDateTime::now_utc(), data.to_vec()));
            },
        }
        Ok(())
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        let path = validate_path(path)?;
        self.storage.write().await.remove(&path).map(|_| ()).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path)))
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let from = validate_path(from)?;
        let to = validate_path(to)?;
        let mut guard = self.storage.write().await;
        let data = guard.remove(&from).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(from)))?;
        guard.insert(to, data);
        Ok(())
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let path = validate_path(path)?;
        let guard = self.storage.read().await;
        let (inserted, data) = guard.get(&path).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(path.clone())))?;
        Ok(FileInfo::new(path, data.len() as u64, *inserted))
    }
}
