//! Catalog Operations
//!
//! The two ways a catalog normally changes between stock takes: adding one
//! new item, and the bulk update pass that refreshes every eligible item in
//! turn. Both persist the index before returning, so the file on disk always
//! reflects the last completed operation.

use std::time::Duration;

use async_stream::stream;
use exn::ResultExt;
use futures::Stream;
use rand::Rng as _;

use crate::error::{ErrorKind, Result};
use crate::index::Catalog;
use crate::row::CatalogRow;
use hemwatch_extract::SourceHandle;
use hemwatch_extract::models::ColorResolution;
use hemwatch_item::{Item, RefreshEffects};
use hemwatch_storage::BackendHandle;

/// What [`add_item`] produced: the persisted item and how its color was
/// resolved, so a caller can tell the user when their requested color was
/// unavailable and the page default got tracked instead.
#[derive(Debug)]
pub struct AddOutcome {
    pub item: Item,
    pub color: ColorResolution,
}

/// Fetch a listing, persist it as a new item, and index it.
///
/// The new row's `added` and `last_updated` both point at the seed
/// observation. Adding a URL the catalog already tracks replaces its row
/// (the old item's files stay on disk; the next stock take reconciles).
pub async fn add_item(
    catalog: &mut Catalog,
    backend: &BackendHandle,
    source: &SourceHandle,
    url: &str,
    color: Option<&str>,
) -> Result<AddOutcome> {
    let listing = source.fetch(url, color).await.or_raise(|| ErrorKind::Fetch)?;
    let resolution = listing.color_resolution.clone();
    if let ColorResolution::Fallback { requested } = &resolution {
        tracing::warn!(%requested, resolved = %listing.color, "Requested color unavailable; tracking the page default");
    }
    if catalog.get(&listing.canonical_url).is_some() {
        tracing::debug!(url = %listing.canonical_url, "Already tracked; replacing its catalog row");
    }

    let mut item = Item::from_listing(listing).or_raise(|| ErrorKind::Item)?;
    item.to_disk(backend.as_ref()).await.or_raise(|| ErrorKind::Item)?;
    catalog.upsert(CatalogRow::from_item(&item)?);
    catalog.persist(backend.as_ref()).await?;
    Ok(AddOutcome { item, color: resolution })
}

/// Which flagged rows a bulk update should still visit.
///
/// By default bought and ignored items are both left alone; either can be
/// opted back in independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateFilter {
    pub include_bought: bool,
    pub include_ignored: bool,
}

impl UpdateFilter {
    fn skips(&self, row: &CatalogRow) -> bool {
        (row.bought && !self.include_bought) || (row.ignore && !self.include_ignored)
    }
}

/// Progress events emitted by [`update_all`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started) — exactly once, with the row count.
/// 2. [`Skipped`](Self::Skipped) / [`Updated`](Self::Updated) — one per
///    row, in catalog order; a failed row yields an `Err` item instead.
/// 3. [`Complete`](Self::Complete) — exactly once, with final counts.
pub enum UpdateEvent {
    /// The pass has begun; emitted exactly once before any other event.
    Started { total: u64 },
    /// A row was excluded by the [`UpdateFilter`] and not fetched.
    Skipped { canonical_url: String },
    /// A row's item was refreshed and its row rewritten.
    Updated { canonical_url: String },
    /// The pass is finished; `updated + failed + skipped` equals the total
    /// announced in [`Started`](Self::Started).
    Complete { updated: u64, failed: u64, skipped: u64 },
}

/// Streams [`UpdateEvent`]s while refreshing every eligible catalog row,
/// strictly one at a time in catalog order.
///
/// A failed row is surfaced as an `Err` item and leaves that row and its
/// item files exactly as they were; the pass then moves on, so one broken
/// page never blocks the rest of the catalog. Consecutive fetches are
/// separated by a [`jittered_delay`] of up to `max_delay`, so requests do
/// not hit the remote site on a predictable cadence. The index is persisted
/// after every successful row and once more at the end, so an interrupted
/// pass leaves `catalog.csv` reflecting every row that completed.
pub fn update_all<'a>(
    catalog: &'a mut Catalog,
    backend: &'a BackendHandle,
    source: &'a SourceHandle,
    filter: UpdateFilter,
    max_delay: Duration,
) -> impl Stream<Item = Result<UpdateEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        let urls: Vec<String> = catalog.rows().map(|row| row.canonical_url.clone()).collect();
        yield Ok(UpdateEvent::Started { total: urls.len() as u64 });

        let mut updated: u64 = 0;
        let mut failed: u64 = 0;
        let mut skipped: u64 = 0;
        let mut first_fetch = true;
        for url in urls {
            let Some(row) = catalog.get(&url).cloned() else {
                continue;
            };
            if filter.skips(&row) {
                skipped += 1;
                yield Ok(UpdateEvent::Skipped { canonical_url: url });
                continue;
            }
            if !first_fetch {
                jittered_delay(max_delay).await;
            }
            first_fetch = false;
            match refresh_row(catalog, backend, source, &row).await {
                Ok(()) => {
                    updated += 1;
                    yield Ok(UpdateEvent::Updated { canonical_url: url });
                },
                Err(e) => {
                    failed += 1;
                    yield Err(e);
                },
            }
        }

        if let Err(e) = catalog.persist(backend.as_ref()).await {
            yield Err(e);
            return;
        }
        yield Ok(UpdateEvent::Complete { updated, failed, skipped });
    })
}

/// Load one row's item, refresh it, rewrite the row, and persist the index.
/// The catalog row is only touched after both the fetch and the disk
/// appends succeeded.
async fn refresh_row(
    catalog: &mut Catalog,
    backend: &BackendHandle,
    source: &SourceHandle,
    row: &CatalogRow,
) -> Result<()> {
    let mut item = Item::from_disk(backend.as_ref(), &row.partition(), &row.filename)
        .await
        .or_raise(|| ErrorKind::Item)?;
    item.refresh(source.as_ref(), backend.as_ref(), RefreshEffects::default())
        .await
        .or_raise(|| ErrorKind::Fetch)?;
    catalog.upsert(CatalogRow::from_item(&item)?);
    catalog.persist(backend.as_ref()).await
}

/// Sleep for a uniformly random duration up to `max`.
///
/// Bulk updates call this between fetches so requests to the remote site
/// arrive on an irregular cadence rather than a mechanical tick.
pub async fn jittered_delay(max: Duration) {
    if max.is_zero() {
        return;
    }
    let millis = rand::rng().random_range(0..=max.as_millis() as u64);
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::CATALOG_FILE;
    use futures::{StreamExt, pin_mut};
    use hemwatch_extract::MockSource;
    use hemwatch_extract::error::ErrorKind as ExtractErrorKind;
    use hemwatch_extract::models::{Category, Composition, Listing, SizeStock};
    use hemwatch_storage::backend::MockBackend;
    use std::path::Path;
    use std::sync::Arc;

    fn listing(url: &str, name: &str, price: f64) -> Listing {
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
            category: Category::new("Woman", "Shirt"),
            price,
            sizes: vec![SizeStock::online("M", 2, true)],
            color_resolution: ColorResolution::Default,
        }
    }

    fn handles(listings: Vec<Listing>) -> (BackendHandle, SourceHandle) {
        let backend: BackendHandle = Arc::new(MockBackend::default());
        let source: SourceHandle = Arc::new(MockSource::with_listings(listings));
        (backend, source)
    }

    async fn drive(
        catalog: &mut Catalog,
        backend: &BackendHandle,
        source: &SourceHandle,
        filter: UpdateFilter,
    ) -> (Vec<String>, Vec<String>, u64) {
        let mut updated_urls = Vec::new();
        let mut skipped_urls = Vec::new();
        let mut failures = 0;
        {
            let events = update_all(catalog, backend, source, filter, Duration::from_millis(5));
            pin_mut!(events);
            while let Some(event) = events.next().await {
                match event {
                    Ok(UpdateEvent::Updated { canonical_url }) => updated_urls.push(canonical_url),
                    Ok(UpdateEvent::Skipped { canonical_url }) => skipped_urls.push(canonical_url),
                    Ok(_) => {},
                    Err(_) => failures += 1,
                }
            }
        }
        (updated_urls, skipped_urls, failures)
    }

    #[tokio::test]
    async fn add_item_persists_and_indexes_in_one_go() {
        let url = "https://shop.example/en/linen-shirt-p01.html";
        let (backend, source) = handles(vec![listing(url, "Linen Shirt", 39.95)]);
        let mut catalog = Catalog::new();

        let outcome = add_item(&mut catalog, &backend, &source, url, None).await.unwrap();
        assert_eq!(outcome.color, ColorResolution::Default);
        assert_eq!(outcome.item.filename(), Some("linen-shirt"));

        let row = catalog.get(url).unwrap();
        assert_eq!(row.added, row.last_updated);
        assert_eq!(row.filename, "linen-shirt");
        assert!(backend.exists(Path::new(CATALOG_FILE)).await.unwrap());
        assert!(backend.exists(Path::new("items/woman/shirt/linen-shirt.json")).await.unwrap());
    }

    #[tokio::test]
    async fn add_item_reports_color_fallback() {
        let url = "https://shop.example/en/linen-shirt-p01.html";
        let (backend, source) = handles(vec![listing(url, "Linen Shirt", 39.95)]);
        let mut catalog = Catalog::new();

        let outcome = add_item(&mut catalog, &backend, &source, url, Some("Crimson")).await.unwrap();
        assert_eq!(outcome.color, ColorResolution::Fallback { requested: "Crimson".to_string() });
        assert_eq!(outcome.item.color, "Ecru");
    }

    #[tokio::test]
    async fn add_item_surfaces_fetch_failures() {
        let url = "https://shop.example/en/gone-p00.html";
        let (backend, _) = handles(vec![]);
        let source: SourceHandle = Arc::new(
            MockSource::with_listings(std::iter::empty())
                .fail_with(url, ExtractErrorKind::NotFound(url.to_string())),
        );
        let mut catalog = Catalog::new();

        let err = add_item(&mut catalog, &backend, &source, url, None).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Fetch));
        assert!(catalog.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn update_all_refreshes_every_row_in_order() {
        let urls = [
            "https://shop.example/en/a-shirt-p01.html",
            "https://shop.example/en/b-shirt-p02.html",
            "https://shop.example/en/c-shirt-p03.html",
        ];
        let (backend, source) = handles(vec![
            listing(urls[0], "A Shirt", 10.0),
            listing(urls[1], "B Shirt", 20.0),
            listing(urls[2], "C Shirt", 30.0),
        ]);
        let mut catalog = Catalog::new();
        for url in urls {
            add_item(&mut catalog, &backend, &source, url, None).await.unwrap();
        }

        let (updated, skipped, failures) =
            drive(&mut catalog, &backend, &source, UpdateFilter::default()).await;
        assert_eq!(updated, urls);
        assert!(skipped.is_empty());
        assert_eq!(failures, 0);

        // Each price history gained exactly one appended row.
        let csv = backend.read(Path::new("items/woman/shirt/price_a-shirt.csv")).await.unwrap();
        assert_eq!(std::str::from_utf8(&csv).unwrap().lines().count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn one_failing_row_never_blocks_the_rest() {
        let urls = [
            "https://shop.example/en/a-shirt-p01.html",
            "https://shop.example/en/b-shirt-p02.html",
            "https://shop.example/en/c-shirt-p03.html",
        ];
        let (backend, source) = handles(vec![
            listing(urls[0], "A Shirt", 10.0),
            listing(urls[1], "B Shirt", 20.0),
            listing(urls[2], "C Shirt", 30.0),
        ]);
        let mut catalog = Catalog::new();
        for url in urls {
            add_item(&mut catalog, &backend, &source, url, None).await.unwrap();
        }

        let broken: SourceHandle = Arc::new(
            MockSource::with_listings(vec![
                listing(urls[0], "A Shirt", 11.0),
                listing(urls[2], "C Shirt", 33.0),
            ])
            .fail_with(urls[1], ExtractErrorKind::Network("timed out".to_string())),
        );
        let (updated, _, failures) =
            drive(&mut catalog, &backend, &broken, UpdateFilter::default()).await;
        assert_eq!(updated, vec![urls[0], urls[2]]);
        assert_eq!(failures, 1);

        // The failed row's files are untouched: still just header and seed.
        let csv = backend.read(Path::new("items/woman/shirt/price_b-shirt.csv")).await.unwrap();
        assert_eq!(std::str::from_utf8(&csv).unwrap().lines().count(), 2);
        let csv = backend.read(Path::new("items/woman/shirt/price_c-shirt.csv")).await.unwrap();
        assert_eq!(std::str::from_utf8(&csv).unwrap().lines().count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn flagged_rows_are_skipped_unless_opted_in() {
        let urls =
            ["https://shop.example/en/a-shirt-p01.html", "https://shop.example/en/b-shirt-p02.html"];
        let (backend, source) =
            handles(vec![listing(urls[0], "A Shirt", 10.0), listing(urls[1], "B Shirt", 20.0)]);
        let mut catalog = Catalog::new();
        for url in urls {
            add_item(&mut catalog, &backend, &source, url, None).await.unwrap();
        }
        let mut bought = catalog.get(urls[0]).cloned().unwrap();
        bought.bought = true;
        catalog.upsert(bought);

        let (updated, skipped, _) =
            drive(&mut catalog, &backend, &source, UpdateFilter::default()).await;
        assert_eq!(updated, vec![urls[1]]);
        assert_eq!(skipped, vec![urls[0]]);

        let include = UpdateFilter { include_bought: true, ..UpdateFilter::default() };
        let (updated, skipped, _) = drive(&mut catalog, &backend, &source, include).await;
        assert_eq!(updated.len(), 2);
        assert!(skipped.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn jittered_delay_never_exceeds_the_cap() {
        let before = tokio::time::Instant::now();
        jittered_delay(Duration::from_millis(250)).await;
        assert!(before.elapsed() <= Duration::from_millis(250));
        // A zero cap returns without sleeping at all.
        let before = tokio::time::Instant::now();
        jittered_delay(Duration::ZERO).await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
