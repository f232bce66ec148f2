//! Path validation utilities.
//!
//! Storage paths are always relative to the library root. Validation rejects
//! anything that could escape it (`..` traversal past the root, absolute
//! prefixes) and normalizes the rest.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a storage path and normalizes it.
///
/// Paths never escape the library root: `..` components are resolved against
/// the components seen so far and popping past the first one is an error.
/// Null bytes are rejected explicitly — they pass through `Path::components()`
/// on Unix but truncate in C-based syscalls.
///
/// # Returns
/// The normalized path, or [`InvalidPath`](crate::error::ErrorKind::InvalidPath).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use hemwatch_storage::validate_path;
/// // Valid paths
/// assert!(validate_path("items/women/blazers/price_allure-blazer.csv").is_ok());
/// assert!(validate_path("items/a/../b/catalog.csv").is_ok()); // (never leaves the root)
/// // Invalid paths
/// assert!(validate_path("../etc/passwd").is_err());
/// assert!(validate_path("items/../../b").is_err()); // (leaves the root)
/// // Paths get resolved
/// assert_eq!(
///     validate_path("items//./women/../men/./shirts/").unwrap(),
///     Path::new("items/men/shirts")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let reject = || ErrorKind::InvalidPath(path.as_ref().to_path_buf());
    let mut normalized: Vec<&std::ffi::OsStr> = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::Normal(segment) => {
                if segment.as_encoded_bytes().contains(&0) {
                    exn::bail!(reject());
                }
                normalized.push(segment);
            },
            // Harmless; drop them.
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(reject()),
            Component::ParentDir => {
                if normalized.pop().is_none() {
                    exn::bail!(reject());
                }
            },
        }
    }
    if normalized.is_empty() {
        exn::bail!(reject());
    }
    Ok(normalized.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_paths() {
        assert_eq!(
            validate(Path::new("items/women/blazers/allure-blazer.json")).unwrap(),
            Path::new("items/women/blazers/allure-blazer.json")
        );
        assert_eq!(validate(Path::new("catalog.csv")).unwrap(), Path::new("catalog.csv"));
    }

    #[test]
    fn test_normalization() {
        assert_eq!(validate(Path::new("items//women/./dresses/")).unwrap(), Path::new("items/women/dresses"));
        assert_eq!(validate(Path::new("a/b/../c")).unwrap(), Path::new("a/c"));
        assert_eq!(validate(Path::new("/rooted/file.csv")).unwrap(), Path::new("rooted/file.csv"));
    }

    #[test]
    fn test_traversal_rejected() {
        assert!(validate(Path::new("../catalog.csv")).is_err());
        assert!(validate(Path::new("items/../../outside")).is_err());
        assert!(validate(Path::new("a/../..")).is_err());
    }

    #[test]
    fn test_degenerate_paths_rejected() {
        assert!(validate(Path::new("")).is_err());
        assert!(validate(Path::new(".")).is_err());
        assert!(validate(Path::new("a/..")).is_err());
    }

    #[test]
    fn test_null_byte_rejected() {
        assert!(validate(Path::new("items/a\0b.csv")).is_err());
    }
}
