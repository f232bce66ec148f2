//! Refreshing an Item
//!
//! A refresh fetches the item's page again and appends one price row and one
//! availability batch, stamped with a single clock reading. The fetch happens
//! first and in full: if it fails, neither the in-memory histories nor the
//! files on disk change at all.

use exn::OptionExt as _;
use exn::ResultExt as _;

use crate::csv;
use crate::error::{ErrorKind, Result};
use crate::filename;
use crate::history::{PricePoint, batch_from_snapshot, observation_stamp};
use crate::item::Item;
use hemwatch_extract::ListingSource;
use hemwatch_storage::StorageBackend;

/// Which copies of the histories a refresh writes to.
///
/// The default touches both. Turning one side off supports dry runs (memory
/// only) and bulk drivers that discard the in-memory record after persisting
/// (disk only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshEffects {
    pub in_memory: bool,
    pub on_disk: bool,
}

impl Default for RefreshEffects {
    fn default() -> Self {
        Self { in_memory: true, on_disk: true }
    }
}

impl RefreshEffects {
    /// Observe without committing anything to disk.
    pub fn dry_run() -> Self {
        Self { in_memory: true, on_disk: false }
    }
}

impl Item {
    /// Fetch the current listing and append one observation to the histories
    /// selected by `effects`.
    ///
    /// Identity and descriptive metadata are left untouched; a refresh only
    /// ever grows the histories. Disk writes are appends of complete rows,
    /// never rewrites, so existing observations cannot be damaged.
    pub async fn refresh(
        &mut self,
        source: &dyn ListingSource,
        backend: &dyn StorageBackend,
        effects: RefreshEffects,
    ) -> Result<()> {
        let listing = source
            .fetch(&self.canonical_url, Some(&self.color))
            .await
            .or_raise(|| ErrorKind::Extract)?;

        let (timestamp, human_timestamp) = observation_stamp();
        let point = PricePoint { timestamp, human_timestamp: human_timestamp.clone(), price: listing.price };
        let batch = batch_from_snapshot(timestamp, &human_timestamp, &listing.sizes);

        if effects.on_disk {
            let slug = self.filename().ok_or_raise(|| ErrorKind::Unpersisted)?.to_string();
            let partition = self.partition();
            let prefixes = filename::flag_prefixes(self.bought, self.ignore);

            let price_rows = csv::render_rows(&[point.to_row()]);
            backend
                .append(&partition.join(filename::price_file(&prefixes, &slug)), price_rows.as_bytes())
                .await
                .or_raise(|| ErrorKind::Storage)?;

            let availability_rows =
                csv::render_rows(&batch.iter().map(|record| record.to_row()).collect::<Vec<_>>());
            backend
                .append(
                    &partition.join(filename::availability_file(&prefixes, &slug)),
                    availability_rows.as_bytes(),
                )
                .await
                .or_raise(|| ErrorKind::Storage)?;
        }

        if effects.in_memory {
            self.price_history.append(point);
            self.availability.extend(batch);
        }

        tracing::debug!(url = %self.canonical_url, price = listing.price, "Item refreshed");
        Ok(())
    }
}
