mod availability;
mod care;
mod category;
mod color;
mod composition;
mod listing;

pub use self::availability::{Location, SizeStock};
pub use self::care::CareInstruction;
pub use self::category::Category;
pub use self::color::ColorResolution;
pub use self::composition::{Composition, CompositionArea, CompositionPart, MaterialShare};
pub use self::listing::{Listing, single_price};

/// Normalized key for comparing user-supplied color names against what a
/// page declares ("Light Blue" requests match "light blue" variants).
pub(crate) fn color_key(s: impl AsRef<str>) -> String {
    s.as_ref().trim().to_lowercase()
}
