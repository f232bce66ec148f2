//! Catalog Index Rows
//!
//! One row per tracked item, keyed by canonical URL. A row is a cheap
//! summary of the item's files — everything needed to list, filter, and
//! locate an item without opening its metadata document. Rows are derived
//! state: a stock take can always rebuild every one of them from disk.

use std::path::PathBuf;

use crate::error::{ErrorKind, Result};
use hemwatch_extract::models::Category;
use hemwatch_item::{Item, human_timestamp, partition};

/// Columns of `catalog.csv`, in canonical order. The category kind column is
/// named `type` on disk for continuity with older index files.
pub const CATALOG_COLUMNS: [&str; 10] = [
    "canonical_url",
    "audience_segment",
    "type",
    "filename",
    "added",
    "added_human",
    "last_updated",
    "last_updated_human",
    "bought",
    "ignore",
];

/// One item's entry in the catalog index.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub canonical_url: String,
    pub audience_segment: String,
    pub kind: String,
    /// The item's on-disk slug within its partition.
    pub filename: String,
    /// Unix timestamp of the item's first observation.
    pub added: i64,
    pub added_human: String,
    /// Unix timestamp of the item's most recent observation.
    pub last_updated: i64,
    pub last_updated_human: String,
    pub bought: bool,
    pub ignore: bool,
}

impl CatalogRow {
    /// Summarise a persisted item into its index row.
    pub fn from_item(item: &Item) -> Result<Self> {
        let filename = item.filename().ok_or_else(|| exn::Exn::from(ErrorKind::Unpersisted))?;
        let (added, last_updated) = match (item.added(), item.last_updated()) {
            (Some(added), Some(last_updated)) => (added, last_updated),
            _ => exn::bail!(ErrorKind::Unpersisted),
        };
        Ok(Self {
            canonical_url: item.canonical_url.clone(),
            audience_segment: item.category.audience_segment.clone(),
            kind: item.category.kind.clone(),
            filename: filename.to_string(),
            added,
            added_human: human_timestamp(added),
            last_updated,
            last_updated_human: human_timestamp(last_updated),
            bought: item.bought,
            ignore: item.ignore,
        })
    }

    /// The partition directory the row's item files live in.
    pub fn partition(&self) -> PathBuf {
        partition(&Category {
            audience_segment: self.audience_segment.clone(),
            kind: self.kind.clone(),
        })
    }

    pub(crate) fn to_row(&self) -> Vec<String> {
        vec![
            self.canonical_url.clone(),
            self.audience_segment.clone(),
            self.kind.clone(),
            self.filename.clone(),
            self.added.to_string(),
            self.added_human.clone(),
            self.last_updated.to_string(),
            self.last_updated_human.clone(),
            self.bought.to_string(),
            self.ignore.to_string(),
        ]
    }

    pub(crate) fn from_row(row: Vec<String>) -> Result<Self> {
        let [canonical_url, audience_segment, kind, filename, added, added_human, last_updated, last_updated_human, bought, ignore]: [String; 10] =
            row.try_into()
                .map_err(|_| exn::Exn::from(ErrorKind::InvalidRow("row width")))?;
        Ok(Self {
            canonical_url,
            audience_segment,
            kind,
            filename,
            added: added
                .parse()
                .map_err(|_| exn::Exn::from(ErrorKind::InvalidRow("added")))?,
            added_human,
            last_updated: last_updated
                .parse()
                .map_err(|_| exn::Exn::from(ErrorKind::InvalidRow("last_updated")))?,
            last_updated_human,
            bought: parse_flag(&bought, "bought")?,
            ignore: parse_flag(&ignore, "ignore")?,
        })
    }
}

fn parse_flag(text: &str, column: &'static str) -> Result<bool> {
    match text {
        "true" | "True" | "1" => Ok(true),
        "false" | "False" | "0" | "" => Ok(false),
        _ => exn::bail!(ErrorKind::InvalidRow(column)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_row(url: &str, last_updated: i64) -> CatalogRow {
        CatalogRow {
            canonical_url: url.to_string(),
            audience_segment: "Woman".to_string(),
            kind: "Shirt".to_string(),
            filename: "linen-blend-shirt".to_string(),
            added: 1700000000,
            added_human: human_timestamp(1700000000),
            last_updated,
            last_updated_human: human_timestamp(last_updated),
            bought: false,
            ignore: false,
        }
    }

    #[test]
    fn rows_round_trip_through_fields() {
        let row = sample_row("https://shop.example/en/linen-shirt-p01.html", 1700086400);
        let restored = CatalogRow::from_row(row.to_row()).unwrap();
        assert_eq!(restored, row);
    }

    #[test]
    fn partition_is_lowercased_from_category() {
        let row = sample_row("https://shop.example/x", 1);
        assert_eq!(row.partition(), PathBuf::from("items/woman/shirt"));
    }

    #[test]
    fn bad_timestamps_are_rejected_with_the_column_name() {
        let mut fields = sample_row("u", 1).to_row();
        fields[6] = "soon".to_string();
        let err = CatalogRow::from_row(fields).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidRow("last_updated")));
    }
}
