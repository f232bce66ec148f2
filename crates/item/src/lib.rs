//! Item records for hemwatch.
//!
//! An item record couples one tracked product variant's identity and
//! metadata with two append-only observation histories (price and
//! availability). This crate owns the record's life cycle: creation from a
//! fetched listing, persistence as three small files in a category
//! partition, restoration from those files, and the refresh operation that
//! appends new observations.
//!
//! The CSV and schema helpers are public because the catalog index stores
//! its own table in the same format.

pub mod csv;
pub mod error;
mod filename;
mod history;
mod item;
mod persist;
pub mod schema;
mod update;

pub use crate::filename::{ITEMS_ROOT, partition, slug};
pub use crate::history::{
    AvailabilityHistory, AvailabilityRecord, PriceHistory, PricePoint, batch_from_snapshot,
    human_timestamp, observation_stamp,
};
pub use crate::item::Item;
pub use crate::update::RefreshEffects;
