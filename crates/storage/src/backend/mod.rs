//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, which provides a unified
//! interface for the item library's file operations, plus a local filesystem
//! implementation and an in-memory mock for tests.

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
use crate::error::Result;
use crate::file::FileInfo;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::path::Path;
use std::pin::Pin;

type FileInfoStream<'a> = Pin<Box<dyn Stream<Item = Result<FileInfo>> + Send + 'a>>;

/// Unified interface for storage backends.
///
/// The item library is a tree of small files (JSON metadata, CSV histories,
/// the catalog index) and this trait is the only way the rest of the system
/// touches it. History files are append-only, so `append` is a first-class
/// operation rather than a read-modify-write convenience.
///
/// # Path Handling
/// All paths are relative to the storage root and must be validated using
/// [`validate_path`](crate::validate_path) before use. Implementations should
/// enforce this validation.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// # use hemwatch_storage::{StorageBackend, error::Result};
/// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
/// let path = Path::new("items/women/blazers/allure-blazer.json");
/// if backend.exists(path).await? {
///     let metadata = backend.read(path).await?;
///     println!("{} bytes of metadata", metadata.len());
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend. Intended to be unique, but nothing
    /// breaks if it isn't (used for logging only).
    fn name(&self) -> &str;

    /// List all files matching an optional prefix.
    ///
    /// Default implementation collects all the results from
    /// [`list_stream()`](Self::list_stream) into a [`Vec`] before returning.
    async fn list(&self, prefix: Option<&Path>) -> Result<Vec<FileInfo>> {
        self.list_stream(prefix).try_collect().await
    }

    /// Stream file metadata matching an optional prefix.
    ///
    /// Yields results incrementally: the stock take uses this to start
    /// indexing items before the whole partition tree has been walked.
    /// If a prefix is provided, only files whose paths start with the prefix
    /// (component-wise) are returned.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use futures::TryStreamExt;
    /// use std::path::Path;
    /// # use hemwatch_storage::{StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let mut stream = backend.list_stream(Some(Path::new("items/women/")));
    /// while let Some(info) = stream.try_next().await? {
    ///     println!("{}: {} bytes", info.path.display(), info.size);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a>;

    /// Check if a file exists.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Read complete file contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write file contents, replacing any existing file.
    ///
    /// # Notes
    /// - Implementations should create parent directories as needed.
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Append bytes to the end of a file, creating it if absent.
    ///
    /// This is the only mutation history files ever see after creation:
    /// observation rows are appended, prior content is never rewritten.
    /// A crash between two appends leaves the file with whole rows only as
    /// long as callers pass complete rows per call, which they do.
    ///
    /// # Notes
    /// - Implementations should create parent directories as needed.
    async fn append(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Delete a file.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn delete(&self, path: &Path) -> Result<()>;

    /// Rename/move a file within the same backend.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the source
    /// file does not exist.
    ///
    /// # Notes
    /// - Implementations should create parent directories as needed
    /// - If the destination already exists, it will be overwritten
    async fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Get file metadata without reading contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn stat(&self, path: &Path) -> Result<FileInfo>;
}
