//! Scripted listing source for testing.

use crate::error::{ErrorKind, Result};
use crate::models::{ColorResolution, Listing, color_key};
use crate::source::ListingSource;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Scripted [`ListingSource`] for tests.
///
/// Holds a fixed set of listings keyed by canonical URL and returns clones
/// on demand, re-resolving the color against each request. Individual URLs
/// can be scripted to fail, which is how batch-containment tests simulate a
/// flaky remote. Every fetch is recorded so tests can assert call order.
pub struct MockSource {
    listings: HashMap<String, Listing>,
    failures: Mutex<HashMap<String, ErrorKind>>,
    calls: Mutex<Vec<String>>,
}

impl MockSource {
    /// Create a source pre-loaded with listings, keyed by canonical URL.
    pub fn with_listings(listings: impl IntoIterator<Item = Listing>) -> Self {
        Self {
            listings: listings.into_iter().map(|l| (l.canonical_url.clone(), l)).collect(),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script every subsequent fetch of `url` to fail with `kind`.
    pub fn fail_with(self, url: impl Into<String>, kind: ErrorKind) -> Self {
        self.failures.lock().unwrap().insert(url.into(), kind);
        self
    }

    /// URLs fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ListingSource for MockSource {
    async fn fetch(&self, url: &str, color: Option<&str>) -> Result<Listing> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(kind) = self.failures.lock().unwrap().get(url) {
            return Err(exn::Exn::from(kind.clone()));
        }
        let Some(listing) = self.listings.get(url) else {
            exn::bail!(ErrorKind::NotFound(url.to_string()));
        };
        let mut listing = listing.clone();
        listing.color_resolution = match color {
            None => ColorResolution::Default,
            Some(requested) if color_key(requested) == color_key(&listing.color) => ColorResolution::Requested,
            Some(requested) => ColorResolution::Fallback { requested: requested.to_string() },
        };
        Ok(listing)
    }
}
