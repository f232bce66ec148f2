//! The Stock Take
//!
//! A stock take walks every partition under `items/`, loads each item it
//! finds, and rebuilds the catalog index from what is actually on disk. It
//! is the recovery path for a lost or stale index and the reconciliation
//! path after files were moved or edited by hand.

use std::path::PathBuf;

use async_stream::stream;
use exn::ResultExt;
use futures::{Stream, StreamExt, pin_mut};

use crate::error::{ErrorKind, Result};
use crate::index::Catalog;
use crate::row::CatalogRow;
use hemwatch_item::{ITEMS_ROOT, Item};
use hemwatch_storage::BackendHandle;

/// Progress events emitted by [`stock_take`] as it walks the item tree.
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started) — exactly once.
/// 2. [`MetadataDiscovered`](Self::MetadataDiscovered) /
///    [`Indexed`](Self::Indexed) — zero or more times, one pair per
///    readable item, in scan order.
/// 3. [`Complete`](Self::Complete) — exactly once, with final counts.
///
/// An unreadable item surfaces as an `Err` item in place of its `Indexed`
/// event without terminating the stream; only a failure to walk the tree at
/// all is fatal.
pub enum StockTakeEvent {
    /// The walk has begun; emitted exactly once before any other event.
    Started,
    /// A metadata document was found; its item will be loaded next.
    MetadataDiscovered { path: PathBuf },
    /// An item was loaded and summarised into an index row.
    Indexed(Box<CatalogRow>),
    /// The walk is finished. `indexed + skipped` equals the number of
    /// metadata documents discovered.
    Complete { indexed: u64, skipped: u64 },
}

/// Streams [`StockTakeEvent`]s for every item under `items/` in `backend`.
///
/// Only `*.json` files count as items; history CSVs and anything else in a
/// partition are ignored. The stream does not dedup or persist anything —
/// feed the [`Indexed`](StockTakeEvent::Indexed) rows through
/// [`Catalog::merge`] (as [`Catalog::rebuild`] does) to get last-write-wins
/// semantics over duplicate canonical URLs.
pub fn stock_take<'a>(backend: &'a BackendHandle) -> impl Stream<Item = Result<StockTakeEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield Ok(StockTakeEvent::Started);

        let mut indexed: u64 = 0;
        let mut skipped: u64 = 0;
        let files = backend.list_stream(Some(ITEMS_ROOT.as_ref()));
        pin_mut!(files);
        while let Some(info) = files.next().await {
            let info = match info.or_raise(|| ErrorKind::Storage) {
                Ok(info) => info,
                Err(e) => {
                    // The walk itself is broken; nothing sensible to continue with.
                    yield Err(e);
                    return;
                },
            };
            if info.path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            yield Ok(StockTakeEvent::MetadataDiscovered { path: info.path.clone() });

            let (Some(partition), Some(slug)) =
                (info.path.parent(), info.path.file_stem().and_then(|stem| stem.to_str()))
            else {
                skipped += 1;
                yield Err(exn::Exn::from(ErrorKind::Item));
                continue;
            };
            let row = Item::from_disk(backend.as_ref(), partition, slug)
                .await
                .or_raise(|| ErrorKind::Item)
                .and_then(|item| CatalogRow::from_item(&item));
            match row {
                Ok(row) => {
                    indexed += 1;
                    yield Ok(StockTakeEvent::Indexed(Box::new(row)));
                },
                Err(e) => {
                    skipped += 1;
                    yield Err(e);
                },
            }
        }

        yield Ok(StockTakeEvent::Complete { indexed, skipped });
    })
}

impl Catalog {
    /// Rescan the item tree, merge the result into this index, and persist.
    ///
    /// Drives [`stock_take`], merging rows last-write-wins so that duplicate
    /// canonical URLs converge on the most recently updated copy. Existing
    /// rows are kept unless a fresher scanned copy displaces them, so a row
    /// whose item files have gone missing from disk still survives the scan.
    /// Items that fail to load are logged and skipped; a library with one
    /// corrupt item still gets a full index of the rest.
    pub async fn rebuild(&mut self, backend: &BackendHandle) -> Result<()> {
        {
            let events = stock_take(backend);
            pin_mut!(events);
            while let Some(event) = events.next().await {
                match event {
                    Ok(StockTakeEvent::Indexed(row)) => {
                        self.merge(*row);
                    },
                    Ok(StockTakeEvent::Complete { indexed, skipped }) => {
                        tracing::info!(indexed, skipped, total = self.len(), "stock take finished");
                    },
                    Ok(_) => {},
                    Err(error) => {
                        tracing::warn!(%error, "skipping unreadable item during stock take");
                    },
                }
            }
        }
        self.persist(backend.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::CATALOG_FILE;
    use hemwatch_extract::models::{Category, ColorResolution, Composition, Listing};
    use hemwatch_storage::backend::MockBackend;
    use std::path::Path;
    use std::sync::Arc;

    fn listing(url: &str, name: &str, kind: &str) -> Listing {
        Listing {
            canonical_url: url.to_string(),
            reference_id: "0000/000".to_string(),
            part_number: "000000000000".to_string(),
            image_url: None,
            name: name.to_string(),
            color: "Ecru".to_string(),
            color_id: None,
            description: String::new(),
            composition: Composition::default(),
            care: vec![],
            category: Category { audience_segment: "Woman".to_string(), kind: kind.to_string() },
            price: 19.95,
            sizes: vec![],
            color_resolution: ColorResolution::Default,
        }
    }

    async fn seeded_backend() -> BackendHandle {
        let backend: BackendHandle = Arc::new(MockBackend::default());
        for (url, name, kind) in [
            ("https://shop.example/en/linen-shirt-p01.html", "Linen Shirt", "Shirt"),
            ("https://shop.example/en/wool-coat-p02.html", "Wool Coat", "Coat"),
        ] {
            let mut item = Item::from_listing(listing(url, name, kind)).unwrap();
            item.to_disk(backend.as_ref()).await.unwrap();
        }
        backend
    }

    #[tokio::test]
    async fn rebuild_indexes_every_item_on_disk() {
        let backend = seeded_backend().await;
        let mut catalog = Catalog::new();
        catalog.rebuild(&backend).await.unwrap();
        assert_eq!(catalog.len(), 2);
        let shirt = catalog.get("https://shop.example/en/linen-shirt-p01.html").unwrap();
        assert_eq!(shirt.filename, "linen-shirt");
        assert_eq!(shirt.kind, "Shirt");
        assert!(backend.exists(Path::new(CATALOG_FILE)).await.unwrap());
    }

    #[tokio::test]
    async fn rebuild_is_idempotent_to_the_byte() {
        let backend = seeded_backend().await;
        Catalog::new().rebuild(&backend).await.unwrap();
        let first = backend.read(Path::new(CATALOG_FILE)).await.unwrap();
        Catalog::new().rebuild(&backend).await.unwrap();
        let second = backend.read(Path::new(CATALOG_FILE)).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn corrupt_items_are_skipped_not_fatal() {
        let backend = seeded_backend().await;
        backend
            .write(Path::new("items/woman/shirt/broken.json"), b"{ not json")
            .await
            .unwrap();
        let mut catalog = Catalog::new();
        catalog.rebuild(&backend).await.unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[tokio::test]
    async fn existing_rows_survive_missing_item_files() {
        let backend = seeded_backend().await;
        let mut catalog = Catalog::new();
        catalog.rebuild(&backend).await.unwrap();
        assert_eq!(catalog.len(), 2);

        // The item's files vanish from disk; its row is already indexed and
        // a rescan merges rather than starting over, so the row stays.
        backend.delete(Path::new("items/woman/coat/wool-coat.json")).await.unwrap();
        catalog.rebuild(&backend).await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("https://shop.example/en/wool-coat-p02.html").is_some());
    }

    #[tokio::test]
    async fn events_follow_the_documented_order() {
        let backend = seeded_backend().await;
        let events = stock_take(&backend);
        pin_mut!(events);

        assert!(matches!(events.next().await, Some(Ok(StockTakeEvent::Started))));
        let mut discovered = 0;
        let mut indexed = 0;
        loop {
            match events.next().await {
                Some(Ok(StockTakeEvent::MetadataDiscovered { .. })) => discovered += 1,
                Some(Ok(StockTakeEvent::Indexed(_))) => indexed += 1,
                Some(Ok(StockTakeEvent::Complete { indexed: done, skipped })) => {
                    assert_eq!(done, 2);
                    assert_eq!(skipped, 0);
                    break;
                },
                other => panic!("unexpected event: {:?}", other.map(|r| r.is_ok())),
            }
        }
        assert_eq!(discovered, 2);
        assert_eq!(indexed, 2);
        assert!(events.next().await.is_none());
    }

    #[tokio::test]
    async fn duplicate_urls_converge_on_the_freshest_row() {
        let backend = seeded_backend().await;
        // A second item claiming the same canonical URL from a different
        // partition, hand-written with a far-future observation so it is
        // unambiguously the fresher copy.
        let metadata = r#"{
            "canonical_url": "https://shop.example/en/linen-shirt-p01.html",
            "reference_id": "0000/000",
            "part_number": "000000000000",
            "name": "Linen Shirt Renamed",
            "color": "Ecru",
            "description": "",
            "category": { "audience_segment": "Woman", "kind": "Blouse" },
            "filename": "linen-shirt-renamed"
        }"#;
        backend
            .write(Path::new("items/woman/blouse/linen-shirt-renamed.json"), metadata.as_bytes())
            .await
            .unwrap();
        backend
            .write(
                Path::new("items/woman/blouse/price_linen-shirt-renamed.csv"),
                b"timestamp,human_timestamp,price\n9999999999,,14.95\n",
            )
            .await
            .unwrap();
        backend
            .write(
                Path::new("items/woman/blouse/availability_linen-shirt-renamed.csv"),
                b"timestamp,human_timestamp,location,store_id,size,size_id,available,quantity\n",
            )
            .await
            .unwrap();

        let mut catalog = Catalog::new();
        catalog.rebuild(&backend).await.unwrap();
        assert_eq!(catalog.len(), 2);
        let row = catalog.get("https://shop.example/en/linen-shirt-p01.html").unwrap();
        assert_eq!(row.filename, "linen-shirt-renamed");
        assert_eq!(row.last_updated, 9999999999);
    }
}
