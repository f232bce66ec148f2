//! Item Record Error Types

use derive_more::{Display, Error};

/// An item-record error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for item-record operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories for building, persisting, and refreshing
/// an item record.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A listing without a canonical URL cannot be tracked: the URL is the
    /// item's identity and the key it is deduplicated on.
    #[display("listing has no canonical url, refusing to create an item")]
    MissingIdentity,
    /// A stored value could not be interpreted (bad number, bad flag, ...).
    #[display("invalid value in the '{_0}' column")]
    InvalidData(#[error(not(source))] &'static str),
    /// The metadata document on disk is not valid JSON for an item.
    #[display("item metadata document is malformed")]
    Metadata,
    /// The storage backend refused a read, write, or append.
    #[display("storage backend operation failed")]
    Storage,
    /// The listing source failed to produce fresh facts for the item.
    #[display("fetching fresh listing data failed")]
    Extract,
    /// The item has no on-disk identity yet; persist it before asking for
    /// file-level operations.
    #[display("item has not been persisted to disk yet")]
    Unpersisted,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage | Self::Extract)
    }
}
