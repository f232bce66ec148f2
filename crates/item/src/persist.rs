//! Item Persistence
//!
//! An item on disk is three files in its category partition: the metadata
//! document and the two history CSVs. [`Item::to_disk`] writes all three;
//! [`Item::from_disk`] rebuilds the full record from them. History files are
//! otherwise only ever appended to, by [`Item::refresh`](crate::Item::refresh).

use std::path::Path;

use exn::ResultExt as _;
use time::OffsetDateTime;

use crate::error::{ErrorKind, Result};
use crate::filename;
use crate::history::{AvailabilityHistory, PriceHistory};
use crate::item::{Item, ItemMetadata};
use hemwatch_storage::StorageBackend;

fn text(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| exn::Exn::from(ErrorKind::InvalidData("utf-8")))
}

impl Item {
    /// Write the metadata document and both history files.
    ///
    /// On first persist the slug is derived from the item's name; if another
    /// item in the same partition already claimed that slug, a unix timestamp
    /// suffix disambiguates. Once assigned, the slug sticks for the item's
    /// lifetime.
    ///
    /// The CSV names carry the `bought_`/`ignore_` prefixes for the flags as
    /// they are *now*. Rows appended before a flag was toggled sit in files
    /// named for the older flag state and are not renamed here.
    pub async fn to_disk(&mut self, backend: &dyn StorageBackend) -> Result<()> {
        let partition = self.partition();
        let slug = match self.filename() {
            Some(existing) => existing.to_string(),
            None => {
                let mut slug = filename::slug(&self.name);
                let claimed = backend
                    .exists(&partition.join(filename::metadata_file(&slug)))
                    .await
                    .or_raise(|| ErrorKind::Storage)?;
                if claimed {
                    slug = format!("{slug}_{}", OffsetDateTime::now_utc().unix_timestamp());
                }
                slug
            },
        };
        tracing::debug!(%slug, partition = %partition.display(), "Persisting item");

        let metadata = ItemMetadata::capture(self, &slug);
        let document = serde_json::to_string_pretty(&metadata)
            .map_err(|_| exn::Exn::from(ErrorKind::Metadata))?;
        let prefixes = filename::flag_prefixes(self.bought, self.ignore);

        backend
            .write(&partition.join(filename::metadata_file(&slug)), document.as_bytes())
            .await
            .or_raise(|| ErrorKind::Storage)?;
        backend
            .write(
                &partition.join(filename::price_file(&prefixes, &slug)),
                self.price_history.to_csv().as_bytes(),
            )
            .await
            .or_raise(|| ErrorKind::Storage)?;
        backend
            .write(
                &partition.join(filename::availability_file(&prefixes, &slug)),
                self.availability.to_csv().as_bytes(),
            )
            .await
            .or_raise(|| ErrorKind::Storage)?;

        self.filename = Some(slug);
        Ok(())
    }

    /// Rebuild an item from its three files in `partition`.
    ///
    /// The metadata document is read first; the history file names are then
    /// derived from the flags it records, so a flagged item loads the same
    /// files its last full persist wrote.
    pub async fn from_disk(
        backend: &dyn StorageBackend,
        partition: &Path,
        slug: &str,
    ) -> Result<Item> {
        let raw = backend
            .read(&partition.join(filename::metadata_file(slug)))
            .await
            .or_raise(|| ErrorKind::Storage)?;
        let mut metadata: ItemMetadata =
            serde_json::from_slice(&raw).map_err(|_| exn::Exn::from(ErrorKind::Metadata))?;
        // The directory entry is authoritative over whatever the document
        // itself claims its name is.
        metadata.filename = slug.to_string();

        let prefixes = filename::flag_prefixes(metadata.bought, metadata.ignore);
        let price_raw = backend
            .read(&partition.join(filename::price_file(&prefixes, slug)))
            .await
            .or_raise(|| ErrorKind::Storage)?;
        let price_history = PriceHistory::from_csv(&text(price_raw)?)?;
        let availability_raw = backend
            .read(&partition.join(filename::availability_file(&prefixes, slug)))
            .await
            .or_raise(|| ErrorKind::Storage)?;
        let availability = AvailabilityHistory::from_csv(&text(availability_raw)?)?;

        Ok(metadata.restore(price_history, availability))
    }
}
