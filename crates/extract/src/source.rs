use crate::error::Result;
use crate::models::Listing;
use async_trait::async_trait;
use std::sync::Arc;

pub type SourceHandle = Arc<dyn ListingSource + Send + Sync>;

/// A collaborator that turns a product URL into structured facts.
///
/// Implementations own everything volatile: the HTTP transport, the DOM
/// selectors, the embedded data-layer JSON, the store-stock endpoint. The
/// core only ever sees a [`Listing`].
///
/// # Contract
/// - `fetch` is one blocking round trip per call; callers sequence calls
///   themselves (bulk updates are strictly one in-flight fetch at a time).
/// - A requested `color` the page does not offer resolves to the page
///   default with [`ColorResolution::Fallback`](crate::models::ColorResolution::Fallback)
///   recorded on the listing — not an error.
/// - A page declaring more than one distinct price must fail with
///   [`AmbiguousPrice`](crate::error::ErrorKind::AmbiguousPrice).
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch and extract the facts for one product page.
    async fn fetch(&self, url: &str, color: Option<&str>) -> Result<Listing>;
}
