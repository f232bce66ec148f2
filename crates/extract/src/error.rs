//! Extraction Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq)]
pub enum ErrorKind {
    /// The product page does not exist (or no longer exists).
    #[display("listing not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// The page could not be fetched at all.
    #[display("network error: {_0}")]
    Network(#[error(not(source))] String),
    /// The page was fetched but its structure no longer matches what the
    /// collaborator knows how to read.
    #[display("page structure mismatch: {_0}")]
    MalformedPage(#[error(not(source))] String),
    /// A required field could not be found on the page.
    #[display("missing required field: {_0}")]
    MissingField(#[error(not(source))] &'static str),
    /// A field was found but could not be parsed.
    #[display("failed to parse field '{field}', found value: {value}")]
    ParseError {
        /// The field that failed to parse.
        field: &'static str,
        /// Details about the parsing failure.
        value: String,
    },
    /// More than one distinct price was found for a single item. Price must
    /// be a single scalar per fetch; this is fatal, never a warning.
    #[display("more than one distinct price found for this item: {_0}")]
    AmbiguousPrice(#[error(not(source))] String),
    /// The physical store directory file could not be loaded.
    #[display("store directory unavailable: {}", _0.display())]
    StoreDirectory(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A page either parses or it doesn't; only transport-level
        // failures are worth a retry.
        matches!(self, Self::Network(_))
    }
}
