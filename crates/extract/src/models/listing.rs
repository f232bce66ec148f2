use super::{CareInstruction, Category, ColorResolution, Composition, SizeStock};
use crate::error::{ErrorKind, Result};

/// Every fact one fetch of a product page must produce.
///
/// This is the whole contract between a page-scraping collaborator and the
/// core: identity fields, a descriptive snapshot, exactly one price, and the
/// availability snapshot for the captured instant. Timestamps are absent on
/// purpose — the consumer stamps observations when it appends them, so that
/// a price row and its availability batch share one clock reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    /// The normalized, stable product URL. Global unique identity of the
    /// tracked variant; everything else is decoration.
    pub canonical_url: String,
    /// Site-assigned display reference (e.g. "2753/004").
    pub reference_id: String,
    /// Site-assigned part number used by the store-stock endpoint.
    pub part_number: String,
    pub image_url: Option<String>,
    pub name: String,
    /// The resolved color (requested, or the page default on fallback).
    pub color: String,
    /// The retailer's internal id for the resolved color, when declared.
    pub color_id: Option<u64>,
    pub description: String,
    pub composition: Composition,
    pub care: Vec<CareInstruction>,
    pub category: Category,
    /// The single current price. A page declaring more than one distinct
    /// price must fail extraction with
    /// [`AmbiguousPrice`](crate::error::ErrorKind::AmbiguousPrice).
    pub price: f64,
    /// Availability snapshot: one entry per observed (location, size) pair.
    pub sizes: Vec<SizeStock>,
    /// How the color above was decided; fallbacks are observable here.
    pub color_resolution: ColorResolution,
}

/// Collapses the per-size prices a page declares into the single scalar
/// price of the item.
///
/// Pages list a price per size variant; they are expected to agree. One
/// distinct value is returned as-is, more than one is a fatal
/// [`AmbiguousPrice`](ErrorKind::AmbiguousPrice), and an empty list means
/// the price field was missing entirely.
pub fn single_price(prices: impl IntoIterator<Item = f64>) -> Result<f64> {
    let mut distinct: Vec<f64> = Vec::new();
    for price in prices {
        if !distinct.iter().any(|known| *known == price) {
            distinct.push(price);
        }
    }
    match distinct.as_slice() {
        [] => exn::bail!(ErrorKind::MissingField("price")),
        [single] => Ok(*single),
        many => {
            let found = many.iter().map(f64::to_string).collect::<Vec<_>>().join(", ");
            exn::bail!(ErrorKind::AmbiguousPrice(found));
        },
    }
}
