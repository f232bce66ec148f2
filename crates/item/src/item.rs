//! The Item Record
//!
//! An item record is the unit of tracking: the identity and descriptive
//! metadata of one product variant, plus its append-only price and
//! availability histories. Identity is the canonical URL; everything else
//! can change between observations without the item becoming a different
//! item.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ErrorKind, Result};
use crate::filename;
use crate::history::{
    AvailabilityHistory, PriceHistory, PricePoint, batch_from_snapshot, observation_stamp,
};
use hemwatch_extract::models::{CareInstruction, Category, Composition, Listing};

/// One tracked product variant with its full observation history.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Stable product URL; the item's global identity and dedup key.
    pub canonical_url: String,
    /// Site-assigned display reference (e.g. "2753/004").
    pub reference_id: String,
    /// Site-assigned part number used for store stock lookups.
    pub part_number: String,
    pub image_url: Option<String>,
    pub name: String,
    pub color: String,
    pub color_id: Option<u64>,
    pub description: String,
    pub composition: Composition,
    pub care: Vec<CareInstruction>,
    pub category: Category,
    /// User flag: the item was purchased. Set by hand, never by an update.
    pub bought: bool,
    /// User flag: exclude from bulk updates. Set by hand, never by an update.
    pub ignore: bool,
    pub(crate) filename: Option<String>,
    pub(crate) price_history: PriceHistory,
    pub(crate) availability: AvailabilityHistory,
}

impl Item {
    /// Build a brand-new item from a fetched listing, seeding both histories
    /// with one observation stamped now.
    pub fn from_listing(listing: Listing) -> Result<Self> {
        if listing.canonical_url.trim().is_empty() {
            exn::bail!(ErrorKind::MissingIdentity);
        }
        let (timestamp, human_timestamp) = observation_stamp();
        let availability =
            AvailabilityHistory::seed(batch_from_snapshot(timestamp, &human_timestamp, &listing.sizes));
        let price_history = PriceHistory::seed(PricePoint {
            timestamp,
            human_timestamp,
            price: listing.price,
        });
        Ok(Self {
            canonical_url: listing.canonical_url,
            reference_id: listing.reference_id,
            part_number: listing.part_number,
            image_url: listing.image_url,
            name: listing.name,
            color: listing.color,
            color_id: listing.color_id,
            description: listing.description,
            composition: listing.composition,
            care: listing.care,
            category: listing.category,
            bought: false,
            ignore: false,
            filename: None,
            price_history,
            availability,
        })
    }

    /// The on-disk slug, present once the item has been persisted or loaded.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// The category partition directory this item's files live in.
    pub fn partition(&self) -> PathBuf {
        filename::partition(&self.category)
    }

    pub fn price_history(&self) -> &PriceHistory {
        &self.price_history
    }

    pub fn availability(&self) -> &AvailabilityHistory {
        &self.availability
    }

    /// Unix timestamp of the first recorded observation.
    pub fn added(&self) -> Option<i64> {
        self.price_history.added()
    }

    /// Unix timestamp of the most recent recorded observation.
    pub fn last_updated(&self) -> Option<i64> {
        self.price_history.last_updated()
    }
}

/// The shape of the `<slug>.json` document: everything about an item except
/// its histories, which live in their own CSV files beside it.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ItemMetadata {
    pub canonical_url: String,
    pub reference_id: String,
    pub part_number: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub color_id: Option<u64>,
    pub description: String,
    #[serde(default)]
    pub composition: Composition,
    #[serde(default)]
    pub care: Vec<CareInstruction>,
    pub category: Category,
    #[serde(default)]
    pub bought: bool,
    #[serde(default)]
    pub ignore: bool,
    pub filename: String,
}

impl ItemMetadata {
    pub(crate) fn capture(item: &Item, filename: &str) -> Self {
        Self {
            canonical_url: item.canonical_url.clone(),
            reference_id: item.reference_id.clone(),
            part_number: item.part_number.clone(),
            image_url: item.image_url.clone(),
            name: item.name.clone(),
            color: item.color.clone(),
            color_id: item.color_id,
            description: item.description.clone(),
            composition: item.composition.clone(),
            care: item.care.clone(),
            category: item.category.clone(),
            bought: item.bought,
            ignore: item.ignore,
            filename: filename.to_string(),
        }
    }

    pub(crate) fn restore(
        self,
        price_history: PriceHistory,
        availability: AvailabilityHistory,
    ) -> Item {
        Item {
            canonical_url: self.canonical_url,
            reference_id: self.reference_id,
            part_number: self.part_number,
            image_url: self.image_url,
            name: self.name,
            color: self.color,
            color_id: self.color_id,
            description: self.description,
            composition: self.composition,
            care: self.care,
            category: self.category,
            bought: self.bought,
            ignore: self.ignore,
            filename: Some(self.filename),
            price_history,
            availability,
        }
    }
}
