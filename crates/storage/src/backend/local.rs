//! Local filesystem storage backend.
//!
//! Stores the item library in a directory on disk and accesses it with
//! `tokio::fs`. This is the backend every real deployment uses. One update
//! run per storage root at a time is assumed, so no file locking is
//! performed here.

use crate::backend::FileInfoStream;
use crate::error::ErrorKind;
use crate::{FileInfo, StorageBackend, error::Result, path::validate as validate_path};
use async_stream::stream;
use async_trait::async_trait;
use std::fs::{Metadata, create_dir_all as sync_create_dir};
use std::path::{Path, PathBuf};
use tokio::fs::{self, DirEntry};
use tokio::io::AsyncWriteExt;

enum WalkEntry {
    File(FileInfo),
    Descend(PathBuf),
    Skip,
}

/// Local filesystem storage backend.
///
/// All paths are relative to the configured root directory, which is created
/// on construction if it does not exist.
///
/// # Examples
///
/// ```no_run
/// use hemwatch_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("local", "/var/lib/hemwatch")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalBackend {
    name: String,
    /// Root directory of the item library
    root: PathBuf,
}
impl LocalBackend {
    /// Create a new local filesystem backend.
    ///
    /// # Arguments
    /// * `root` - Absolute path to the library root directory
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute, or exists but is not a
    /// directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidPath(root));
            }
        } else {
            // Non-async is fine here; this happens once at startup and it's
            // not worth making the constructor async.
            sync_create_dir(&root).map_err(|e| Self::map_io_error(e, &root))?;
        }
        Ok(Self { name: name.into(), root })
    }

    /// Get the absolute path for a relative storage path.
    ///
    /// Validates the path and joins it with the root directory.
    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    /// Convert an absolute path back to a relative storage path.
    fn relative_path(&self, absolute: impl AsRef<Path>) -> Result<PathBuf> {
        let absolute = absolute.as_ref();
        let relative = absolute.strip_prefix(&self.root).map_err(|_| {
            ErrorKind::BackendError(format!("path `{:?}` is not within root `{:?}`", absolute, self.root))
        })?;
        Ok(validate_path(relative)?)
    }

    /// Shared metadata conversion for both list and stat.
    fn metadata(path: &Path, metadata: Metadata) -> Result<FileInfo> {
        let modified = metadata.modified().map_err(ErrorKind::Io)?.into();
        Ok(FileInfo::new(PathBuf::from(path), metadata.len(), modified))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }

    /// Classify a directory entry for the walk loop. Errors can't be `?`'d
    /// inside the stream macro, so everything funnels through one fallible
    /// helper whose result is yielded or pushed.
    async fn classify(&self, entry: DirEntry, prefix: Option<&Path>) -> Result<WalkEntry> {
        let path = entry.path();
        let metadata = entry.metadata().await.map_err(|e| Self::map_io_error(e, &path))?;
        let relative = self.relative_path(&path)?;
        if let Some(pfx) = prefix
            && !relative.starts_with(pfx)
        {
            return Ok(WalkEntry::Skip);
        }
        if metadata.is_dir() {
            return Ok(WalkEntry::Descend(path));
        }
        if metadata.is_file() {
            return Ok(WalkEntry::File(Self::metadata(&relative, metadata)?));
        }
        // Note: silently drop what is most likely a broken symlink.
        Ok(WalkEntry::Skip)
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a> {
        let validated_prefix = match prefix.map(validate_path).transpose() {
            Ok(pfx) => pfx,
            Err(e) => return Box::pin(futures::stream::once(async { Result::Err(e) })),
        };

        // Walk from the parent directory of the prefix path, so a prefix
        // whose leaf component doesn't exist yet (or is a file) doesn't
        // error. Matching stays component-based via Path::starts_with,
        // so "items/women" will not match "items/womenswear".
        let start_dir = validated_prefix
            .as_ref()
            .map(|prefix| self.root.join(prefix).parent().unwrap_or_else(|| &self.root).to_path_buf())
            .unwrap_or_else(|| self.root.clone());
        let mut stack = vec![start_dir];

        Box::pin(stream! {
            'dirs: while let Some(current) = stack.pop() {
                let mut entries = match fs::read_dir(&current).await {
                    Ok(entries) => entries,
                    // Listing a directory that doesn't exist is an empty
                    // list, not an error: a fresh library has no partitions.
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                    Err(err) => {
                        yield Err(exn::Exn::from(Self::map_io_error(err, &current)));
                        continue 'dirs;
                    }
                };

                'entries: loop {
                    let entry = match entries.next_entry().await {
                        Ok(Some(entry)) => entry,
                        Ok(None) => break 'entries,
                        Err(e) => { yield Err(exn::Exn::from(Self::map_io_error(e, &current))); continue 'entries; },
                    };
                    match self.classify(entry, validated_prefix.as_deref()).await {
                        Ok(WalkEntry::File(f)) => yield Ok(f),
                        Ok(WalkEntry::Descend(d)) => stack.push(d),
                        Ok(WalkEntry::Skip) => {},
                        Err(e) => yield Err(e),
                    };
                }
            }
        })
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::try_exists(&abs_path).await.map_err(ErrorKind::Io)?)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::read(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        if let Some(parent) = abs_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Self::map_io_error(e, path))?;
        }
        Ok(fs::write(&abs_path, data).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn append(&self, path: &Path, data: &[u8]) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        if let Some(parent) = abs_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Self::map_io_error(e, path))?;
        }
        let mut file = fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&abs_path)
            .await
            .map_err(|e| Self::map_io_error(e, path))?;
        file.write_all(data).await.map_err(ErrorKind::Io)?;
        file.flush().await.map_err(ErrorKind::Io)?;
        Ok(())
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::remove_file(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let from_path = self.absolute_path(from)?;
        let to_path = self.absolute_path(to)?;
        if let Some(parent) = to_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Self::map_io_error(e, to))?;
        }
        Ok(fs::rename(&from_path, &to_path).await.map_err(|e| Self::map_io_error(e, to))?)
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let abs_path = self.absolute_path(path)?;
        let metadata = fs::metadata(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?;
        Self::metadata(path, metadata)
    }
}
