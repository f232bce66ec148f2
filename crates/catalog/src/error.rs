//! Catalog Error Types

use derive_more::{Display, Error};

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories for index maintenance and bulk operations.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The catalog index file could not be read or written.
    #[display("catalog index file operation failed")]
    Index,
    /// A row of the catalog index holds a value that does not parse.
    #[display("invalid value in the '{_0}' column of the catalog index")]
    InvalidRow(#[error(not(source))] &'static str),
    /// An item must be persisted (and so have a filename and at least one
    /// observation) before it can be indexed.
    #[display("item cannot be indexed before it is persisted")]
    Unpersisted,
    /// Loading or persisting an item's files failed.
    #[display("item record operation failed")]
    Item,
    /// Fetching fresh listing data from the source failed.
    #[display("fetching fresh listing data failed")]
    Fetch,
    /// The storage backend refused an operation.
    #[display("storage backend operation failed")]
    Storage,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage | Self::Fetch)
    }
}
