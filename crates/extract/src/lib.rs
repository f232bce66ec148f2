//! Extraction contract for hemwatch.
//!
//! Scraping a retailer's product page is deliberately out of this crate's
//! hands: page structure is volatile, site-specific trivia that changes
//! without notice. What lives here instead is the *contract* between that
//! volatile collaborator and the stable core — the structured facts a fetch
//! must produce ([`models::Listing`]), the traits a collaborator implements
//! ([`ListingSource`], [`StoreStockSource`]), the error taxonomy, and the
//! explicitly-loaded physical store directory.
//!
//! The historical data format on disk never depends on anything in a
//! collaborator implementation; if the remote site changes shape, only the
//! collaborator breaks.

pub mod error;
#[cfg(feature = "mock")]
mod mock;
pub mod models;
mod source;
mod stores;

#[cfg(feature = "mock")]
pub use crate::mock::MockSource;
pub use crate::source::{ListingSource, SourceHandle};
pub use crate::stores::{StoreDirectory, StoreStockSource};
