use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Two-level classification of an item, used for storage partitioning.
///
/// Mirrors the retailer's breadcrumb trail: an audience segment ("WOMAN",
/// "MAN", "KIDS") and a garment kind ("BLAZERS", "DRESSES"). Values are
/// stored as discovered; lower-casing happens where the partition path is
/// derived, not here.
#[derive(Debug, Display, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[display("{audience_segment} / {kind}")]
pub struct Category {
    pub audience_segment: String,
    pub kind: String,
}

impl Category {
    pub fn new(audience_segment: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            audience_segment: audience_segment.into(),
            kind: kind.into(),
        }
    }
}
