use serde::{Deserialize, Serialize};

/// How the color of a fetched listing was decided.
///
/// A requested color that the page does not offer is *not* an error: the
/// fetch degrades to the page's default color. The caller must be able to
/// observe that this happened (to warn the user, or to correct a typo'd
/// tracking request), so the resolution travels with the listing instead of
/// being swallowed inside the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorResolution {
    /// No color preference was given; the page's default color was used.
    Default,
    /// The requested color exists on the page and was selected.
    Requested,
    /// The requested color is not offered; the page's default was used
    /// instead.
    Fallback {
        /// The color that was asked for but not found.
        requested: String,
    },
}

impl ColorResolution {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}
