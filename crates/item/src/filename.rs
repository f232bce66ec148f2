//! On-Disk Naming
//!
//! An item's files live together in a category partition under the library
//! root, named after a slug of the item's display name:
//!
//! ```text
//! items/<audience_segment>/<kind>/<slug>.json
//! items/<audience_segment>/<kind>/price_<slug>.csv
//! items/<audience_segment>/<kind>/availability_<slug>.csv
//! ```
//!
//! The `bought_`/`ignore_` flag prefixes apply to the CSV files only; the
//! metadata document keeps its bare name so a directory scan can find every
//! item by globbing `*.json` regardless of flag state.

use std::path::PathBuf;

use hemwatch_extract::models::Category;
use rslug::slugify;

/// Directory under the library root that holds all item partitions.
pub const ITEMS_ROOT: &str = "items";

/// The partition directory for a category, always lower-cased.
pub fn partition(category: &Category) -> PathBuf {
    PathBuf::from(ITEMS_ROOT)
        .join(category.audience_segment.to_lowercase())
        .join(category.kind.to_lowercase())
}

/// Slugify a display name into a filesystem-safe stem.
pub fn slug(name: &str) -> String {
    slugify!(name)
}

/// Flag prefixes for history files: `bought_` before `ignore_`, so a bought
/// and ignored item's prices live in `bought_ignore_price_<slug>.csv`.
pub(crate) fn flag_prefixes(bought: bool, ignore: bool) -> String {
    let mut prefixes = String::new();
    if bought {
        prefixes.push_str("bought_");
    }
    if ignore {
        prefixes.push_str("ignore_");
    }
    prefixes
}

pub(crate) fn metadata_file(slug: &str) -> String {
    format!("{slug}.json")
}

pub(crate) fn price_file(prefixes: &str, slug: &str) -> String {
    format!("{prefixes}price_{slug}.csv")
}

pub(crate) fn availability_file(prefixes: &str, slug: &str) -> String {
    format!("{prefixes}availability_{slug}.csv")
}
