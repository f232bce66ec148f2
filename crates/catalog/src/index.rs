//! The Catalog Index
//!
//! A single `catalog.csv` at the library root, one row per tracked item,
//! keyed and sorted by canonical URL. The index is derived state over the
//! item files: convenient for listing and filtering, never authoritative.
//! Losing or corrupting it costs nothing but a stock take.

use std::collections::BTreeMap;

use exn::ResultExt as _;
use std::path::Path;

use crate::error::{ErrorKind, Result};
use crate::row::{CATALOG_COLUMNS, CatalogRow};
use hemwatch_item::csv;
use hemwatch_item::schema;
use hemwatch_storage::StorageBackend;
use hemwatch_storage::error::ErrorKind as StorageErrorKind;

/// Name of the index file, relative to the library root.
pub const CATALOG_FILE: &str = "catalog.csv";

/// The in-memory catalog index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    rows: BTreeMap<String, CatalogRow>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the index from the backend. A missing file is an empty catalog,
    /// not an error: the index is rebuildable and a fresh library has none.
    pub async fn load(backend: &dyn StorageBackend) -> Result<Self> {
        let raw = match backend.read(Path::new(CATALOG_FILE)).await {
            Ok(raw) => raw,
            Err(error) if matches!(&*error, StorageErrorKind::NotFound(_)) => {
                tracing::warn!("no catalog index on disk, starting empty; run a stock take to rebuild it");
                return Ok(Self::default());
            },
            Err(error) => return Err(error).or_raise(|| ErrorKind::Index),
        };
        let text = String::from_utf8(raw).map_err(|_| exn::Exn::from(ErrorKind::Index))?;
        Self::from_csv(&text)
    }

    /// Write the index back out, sorted by canonical URL. Two catalogs with
    /// the same rows always serialise to identical bytes.
    pub async fn persist(&self, backend: &dyn StorageBackend) -> Result<()> {
        backend
            .write(Path::new(CATALOG_FILE), self.to_csv().as_bytes())
            .await
            .or_raise(|| ErrorKind::Index)
    }

    pub fn to_csv(&self) -> String {
        let rows: Vec<Vec<String>> = self.rows.values().map(CatalogRow::to_row).collect();
        csv::render(&CATALOG_COLUMNS, &rows)
    }

    pub fn from_csv(text: &str) -> Result<Self> {
        let mut parsed = csv::parse(text);
        if parsed.is_empty() {
            return Ok(Self::default());
        }
        let header = parsed.remove(0);
        let mut catalog = Self::default();
        for fields in schema::reindex(&header, parsed, &CATALOG_COLUMNS) {
            catalog.merge(CatalogRow::from_row(fields)?);
        }
        Ok(catalog)
    }

    /// Insert or replace a row unconditionally.
    pub fn upsert(&mut self, row: CatalogRow) {
        self.rows.insert(row.canonical_url.clone(), row);
    }

    /// Insert a row, keeping whichever of resident and candidate was updated
    /// most recently. On an exact tie the candidate wins, so re-scanning a
    /// library converges on the freshest copy of every row.
    ///
    /// Returns `true` if the candidate was kept.
    pub fn merge(&mut self, row: CatalogRow) -> bool {
        if let Some(resident) = self.rows.get(&row.canonical_url)
            && row.last_updated < resident.last_updated
        {
            return false;
        }
        self.upsert(row);
        true
    }

    pub fn get(&self, canonical_url: &str) -> Option<&CatalogRow> {
        self.rows.get(canonical_url)
    }

    /// All rows, ordered by canonical URL.
    pub fn rows(&self) -> impl Iterator<Item = &CatalogRow> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
