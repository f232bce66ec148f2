use crate::error::{ErrorKind, Result};
use crate::models::SizeStock;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// The set of physical stores whose stock is worth asking about.
///
/// Loaded explicitly from a JSON file and passed into whichever collaborator
/// needs it. There is deliberately no process-wide directory loaded as a
/// side effect of importing something; a missing file fails the explicit
/// load step with [`ErrorKind::StoreDirectory`] and nothing else.
///
/// # File format
///
/// ```json
/// [{"id": 4181, "addressLines": ["52 Calle Serrano", "Madrid"]}]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreDirectory {
    stores: BTreeMap<u64, String>,
}

#[derive(Deserialize)]
struct StoreEntry {
    id: u64,
    #[serde(rename = "addressLines", default)]
    address_lines: Vec<String>,
}

impl StoreDirectory {
    /// Load the directory from a JSON file.
    ///
    /// Loading is synchronous on purpose — it happens once, at startup,
    /// before any fetch is issued.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reject = || ErrorKind::StoreDirectory(path.to_path_buf());
        let raw = std::fs::read_to_string(path).map_err(|_| reject())?;
        let entries: Vec<StoreEntry> = serde_json::from_str(&raw).map_err(|_| reject())?;
        Ok(Self::from_entries(entries.into_iter().map(|e| (e.id, e.address_lines.join(" ")))))
    }

    /// Build a directory from (store id, address) pairs. Mostly for tests.
    pub fn from_entries(entries: impl IntoIterator<Item = (u64, String)>) -> Self {
        Self { stores: entries.into_iter().collect() }
    }

    /// The address on record for a store id.
    pub fn address(&self, id: u64) -> Option<&str> {
        self.stores.get(&id).map(String::as_str)
    }

    /// All store ids, in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.stores.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

/// A collaborator that answers "which of these stores have this part in
/// which sizes, and how many."
///
/// An empty answer is a valid answer — zero stores carrying stock is an
/// observation, not an error.
#[async_trait]
pub trait StoreStockSource: Send + Sync {
    /// Per-store, per-size quantities for a part number, limited to the
    /// stores in `directory`.
    async fn store_stock(&self, part_number: &str, directory: &StoreDirectory) -> Result<Vec<SizeStock>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": 4181, "addressLines": ["52 Calle Serrano", "Madrid"]}}]"#).unwrap();
        let directory = StoreDirectory::load(file.path()).unwrap();
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.address(4181), Some("52 Calle Serrano Madrid"));
        assert_eq!(directory.address(9999), None);
    }

    #[test]
    fn test_load_missing_file_is_explicit_failure() {
        let err = StoreDirectory::load("/nonexistent/stores.json").unwrap_err();
        assert!(matches!(&*err, ErrorKind::StoreDirectory(_)));
    }

    #[test]
    fn test_load_malformed_json_is_explicit_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = StoreDirectory::load(file.path()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::StoreDirectory(_)));
    }

    #[test]
    fn test_ids_sorted() {
        let directory = StoreDirectory::from_entries([(7, "b".to_string()), (3, "a".to_string())]);
        assert_eq!(directory.ids().collect::<Vec<_>>(), vec![3, 7]);
    }
}
