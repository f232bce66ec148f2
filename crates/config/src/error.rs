//! Configuration Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories for loading and applying configuration.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A configuration source could not be read or did not parse into the
    /// expected shape.
    #[display("configuration could not be loaded")]
    Invalid,
    /// No usable location for configuration or data directories could be
    /// determined on this platform.
    #[display("no home directory available to anchor default paths")]
    NoProjectDirs,
    /// The configured library root could not be opened as a storage backend.
    #[display("library root is unusable: {}", _0.display())]
    BadLibraryRoot(#[error(not(source))] PathBuf),
}
