use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Structured material breakdown of a garment, as declared by the retailer.
///
/// The shape follows the retailer's own data model: a garment is made of
/// parts (shell, lining), each part has material components and optionally
/// sub-areas with their own components, plus free-text microcontents and
/// reinforcements. Sub-fields the retailer adds later land in `extra` and
/// are reported as a warning rather than failing the fetch — an unknown
/// composition detail is cosmetic, not structural.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    #[serde(default)]
    pub parts: Vec<CompositionPart>,
    #[serde(default)]
    pub exceptions: Vec<String>,
    #[serde(default, flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionPart {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub components: Vec<MaterialShare>,
    #[serde(default)]
    pub areas: Vec<CompositionArea>,
    #[serde(default)]
    pub microcontents: Vec<String>,
    #[serde(default)]
    pub reinforcements: Vec<String>,
    #[serde(default, flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionArea {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub components: Vec<MaterialShare>,
}

/// One material and its share of a part or area, e.g. "78% wool".
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialShare {
    pub material: String,
    pub percentage: String,
}

impl Composition {
    /// Emits a warning for every sub-field the retailer declared that this
    /// model does not recognize. Unknown sub-fields never fail a fetch.
    pub fn warn_on_unknown_fields(&self) {
        for key in self.extra.keys() {
            tracing::warn!(field = %key, "unexpected field encountered in composition");
        }
        for part in &self.parts {
            for key in part.extra.keys() {
                tracing::warn!(part = %part.description, field = %key, "unexpected field encountered in composition part");
            }
        }
    }

    /// Renders the breakdown as indented plain text, one material per line.
    ///
    /// ```text
    /// OUTER SHELL
    ///     78% wool
    ///     22% polyamide
    ///     LINING
    ///         100% viscose
    /// ```
    pub fn render(&self) -> String {
        self.warn_on_unknown_fields();
        let mut out = String::new();
        for part in &self.parts {
            let _ = writeln!(out, "{}", part.description);
            for component in &part.components {
                let _ = writeln!(out, "\t{} {}", component.percentage, component.material);
            }
            for area in &part.areas {
                let _ = writeln!(out, "\t{}", area.description);
                for component in &area.components {
                    let _ = writeln!(out, "\t\t{} {}", component.percentage, component.material);
                }
            }
            if !part.microcontents.is_empty() {
                let _ = writeln!(out, "\tMICROCONTENTS");
                for microcontent in &part.microcontents {
                    let _ = writeln!(out, "\t\t{microcontent}");
                }
            }
            if !part.reinforcements.is_empty() {
                let _ = writeln!(out, "\tREINFORCEMENTS");
                for reinforcement in &part.reinforcements {
                    let _ = writeln!(out, "\t\t{reinforcement}");
                }
            }
        }
        if !self.exceptions.is_empty() {
            let _ = writeln!(out, "EXCEPTIONS");
            for exception in &self.exceptions {
                let _ = writeln!(out, "\t{exception}");
            }
        }
        out
    }
}
