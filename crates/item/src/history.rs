//! Append-Only Observation Histories
//!
//! Every refresh of an item appends rows here; nothing ever rewrites or
//! removes a row that was recorded earlier. Each row carries the observation
//! time twice: a unix timestamp that code sorts and compares on, and an
//! RFC 3339 rendering for humans reading the raw files. The integer is
//! authoritative; the text column is a courtesy.

use exn::OptionExt as _;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::csv;
use crate::error::{ErrorKind, Result};
use crate::schema::{self, AVAILABILITY_COLUMNS, PRICE_COLUMNS};
use hemwatch_extract::models::{Location, SizeStock};

/// The current moment as an `(unix, rfc3339)` pair for stamping new rows.
pub fn observation_stamp() -> (i64, String) {
    let now = OffsetDateTime::now_utc();
    (now.unix_timestamp(), human_timestamp(now.unix_timestamp()))
}

/// Render a unix timestamp as RFC 3339 UTC, or an empty string for values
/// outside the representable range.
pub fn human_timestamp(timestamp: i64) -> String {
    OffsetDateTime::from_unix_timestamp(timestamp)
        .ok()
        .and_then(|moment| moment.format(&Rfc3339).ok())
        .unwrap_or_default()
}

fn parse_bool(text: &str) -> Option<bool> {
    // `True`/`False` appear in files written by earlier tooling.
    match text {
        "true" | "True" | "1" => Some(true),
        "false" | "False" | "0" => Some(false),
        _ => None,
    }
}

fn parse_optional<T: std::str::FromStr>(text: &str, column: &'static str) -> Result<Option<T>> {
    if text.is_empty() {
        return Ok(None);
    }
    match text.parse() {
        Ok(value) => Ok(Some(value)),
        Err(_) => exn::bail!(ErrorKind::InvalidData(column)),
    }
}

/// One observed price at one moment.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub timestamp: i64,
    pub human_timestamp: String,
    pub price: f64,
}

impl PricePoint {
    pub(crate) fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp.to_string(),
            self.human_timestamp.clone(),
            self.price.to_string(),
        ]
    }

    fn from_row(row: Vec<String>) -> Result<Self> {
        let [timestamp, human_timestamp, price]: [String; 3] = row
            .try_into()
            .map_err(|_| exn::Exn::from(ErrorKind::InvalidData("price row")))?;
        Ok(Self {
            timestamp: timestamp
                .parse()
                .map_err(|_| exn::Exn::from(ErrorKind::InvalidData("timestamp")))?,
            human_timestamp,
            price: price
                .parse()
                .map_err(|_| exn::Exn::from(ErrorKind::InvalidData("price")))?,
        })
    }
}

/// The full price history of an item, ordered as observed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceHistory {
    points: Vec<PricePoint>,
}

impl PriceHistory {
    /// Start a history with its first observation.
    pub fn seed(point: PricePoint) -> Self {
        Self { points: vec![point] }
    }

    /// Record a new observation. Existing points are never touched.
    pub fn append(&mut self, point: PricePoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The earliest observation timestamp, i.e. when tracking began.
    pub fn added(&self) -> Option<i64> {
        self.points.iter().map(|point| point.timestamp).min()
    }

    /// The most recent observation timestamp.
    pub fn last_updated(&self) -> Option<i64> {
        self.points.iter().map(|point| point.timestamp).max()
    }

    /// Render the whole history, header included.
    pub fn to_csv(&self) -> String {
        let rows: Vec<Vec<String>> = self.points.iter().map(PricePoint::to_row).collect();
        csv::render(&PRICE_COLUMNS, &rows)
    }

    /// Load a history from file contents, reindexing stale column layouts.
    pub fn from_csv(text: &str) -> Result<Self> {
        let mut rows = csv::parse(text);
        if rows.is_empty() {
            return Ok(Self::default());
        }
        let header = rows.remove(0);
        let points = schema::reindex(&header, rows, &PRICE_COLUMNS)
            .into_iter()
            .map(PricePoint::from_row)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { points })
    }
}

/// One observed size/location stock state at one moment.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityRecord {
    pub timestamp: i64,
    pub human_timestamp: String,
    /// `"online"` or the physical store's address label.
    pub location: String,
    pub store_id: Option<u64>,
    pub size: String,
    pub size_id: Option<u64>,
    pub available: bool,
    pub quantity: Option<u32>,
}

impl AvailabilityRecord {
    /// Stamp one size's stock state into a history row.
    pub fn from_stock(timestamp: i64, human_timestamp: &str, stock: &SizeStock) -> Self {
        let (location, store_id) = match &stock.location {
            Location::Online => (Location::Online.to_string(), None),
            Location::Store { id, address } => (address.clone(), Some(*id)),
        };
        Self {
            timestamp,
            human_timestamp: human_timestamp.to_string(),
            location,
            store_id,
            size: stock.size.clone(),
            size_id: stock.size_id,
            available: stock.available,
            quantity: stock.quantity,
        }
    }

    pub(crate) fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp.to_string(),
            self.human_timestamp.clone(),
            self.location.clone(),
            self.store_id.map(|id| id.to_string()).unwrap_or_default(),
            self.size.clone(),
            self.size_id.map(|id| id.to_string()).unwrap_or_default(),
            self.available.to_string(),
            self.quantity.map(|q| q.to_string()).unwrap_or_default(),
        ]
    }

    fn from_row(row: Vec<String>) -> Result<Self> {
        let [timestamp, human_timestamp, location, store_id, size, size_id, available, quantity]: [String; 8] =
            row.try_into()
                .map_err(|_| exn::Exn::from(ErrorKind::InvalidData("availability row")))?;
        Ok(Self {
            timestamp: timestamp
                .parse()
                .map_err(|_| exn::Exn::from(ErrorKind::InvalidData("timestamp")))?,
            human_timestamp,
            location,
            store_id: parse_optional(&store_id, "store_id")?,
            size,
            size_id: parse_optional(&size_id, "size_id")?,
            available: parse_bool(&available)
                .ok_or_raise(|| ErrorKind::InvalidData("available"))?,
            quantity: parse_optional(&quantity, "quantity")?,
        })
    }
}

/// Stamp a whole stock snapshot into history rows sharing one timestamp.
pub fn batch_from_snapshot(
    timestamp: i64,
    human_timestamp: &str,
    sizes: &[SizeStock],
) -> Vec<AvailabilityRecord> {
    sizes
        .iter()
        .map(|stock| AvailabilityRecord::from_stock(timestamp, human_timestamp, stock))
        .collect()
}

/// The full availability history of an item, ordered as observed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailabilityHistory {
    records: Vec<AvailabilityRecord>,
}

impl AvailabilityHistory {
    /// Start a history from its first snapshot batch.
    pub fn seed(batch: Vec<AvailabilityRecord>) -> Self {
        Self { records: batch }
    }

    /// Record a new snapshot batch. Existing records are never touched.
    pub fn extend(&mut self, batch: Vec<AvailabilityRecord>) {
        self.records.extend(batch);
    }

    pub fn records(&self) -> &[AvailabilityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Render the whole history, header included.
    pub fn to_csv(&self) -> String {
        let rows: Vec<Vec<String>> = self.records.iter().map(AvailabilityRecord::to_row).collect();
        csv::render(&AVAILABILITY_COLUMNS, &rows)
    }

    /// Load a history from file contents, reindexing stale column layouts.
    pub fn from_csv(text: &str) -> Result<Self> {
        let mut rows = csv::parse(text);
        if rows.is_empty() {
            return Ok(Self::default());
        }
        let header = rows.remove(0);
        let records = schema::reindex(&header, rows, &AVAILABILITY_COLUMNS)
            .into_iter()
            .map(AvailabilityRecord::from_row)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(timestamp: i64, price: f64) -> PricePoint {
        PricePoint {
            timestamp,
            human_timestamp: human_timestamp(timestamp),
            price,
        }
    }

    #[test]
    fn human_timestamp_is_rfc3339_utc() {
        assert_eq!(human_timestamp(1700000000), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn added_and_last_updated_ignore_row_order() {
        let mut history = PriceHistory::seed(point(200, 9.99));
        history.append(point(100, 12.99));
        history.append(point(300, 7.99));
        assert_eq!(history.added(), Some(100));
        assert_eq!(history.last_updated(), Some(300));
    }

    #[test]
    fn price_history_survives_a_disk_round_trip() {
        let mut history = PriceHistory::seed(point(1700000000, 19.95));
        history.append(point(1700086400, 15.95));
        let restored = PriceHistory::from_csv(&history.to_csv()).unwrap();
        assert_eq!(restored, history);
    }

    #[test]
    fn price_history_reads_reordered_columns() {
        let text = "price,timestamp,human_timestamp\n9.99,1700000000,2023-11-14T22:13:20Z\n";
        let history = PriceHistory::from_csv(text).unwrap();
        assert_eq!(history.points()[0].price, 9.99);
        assert_eq!(history.points()[0].timestamp, 1700000000);
    }

    #[test]
    fn empty_file_is_an_empty_history() {
        assert!(PriceHistory::from_csv("").unwrap().is_empty());
    }

    #[test]
    fn unparseable_price_is_rejected() {
        let text = "timestamp,human_timestamp,price\n1,t,not-a-number\n";
        let err = PriceHistory::from_csv(text).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData("price")));
    }

    #[test]
    fn availability_reads_legacy_online_only_files() {
        // Files from before store tracking: no location, store, or quantity.
        let text = "timestamp,human_timestamp,size,available\n\
                    1700000000,2023-11-14T22:13:20Z,M,True\n\
                    1700000000,2023-11-14T22:13:20Z,L,False\n";
        let history = AvailabilityHistory::from_csv(text).unwrap();
        assert_eq!(history.len(), 2);
        let first = &history.records()[0];
        assert_eq!(first.size, "M");
        assert!(first.available);
        assert_eq!(first.location, "");
        assert_eq!(first.store_id, None);
        assert_eq!(first.quantity, None);
        assert!(!history.records()[1].available);
    }

    #[test]
    fn availability_round_trips_store_rows() {
        let stock = SizeStock::in_store(4421, "12 High Street", "M", 7, 3);
        let history = AvailabilityHistory::seed(batch_from_snapshot(
            1700000000,
            "2023-11-14T22:13:20Z",
            std::slice::from_ref(&stock),
        ));
        let restored = AvailabilityHistory::from_csv(&history.to_csv()).unwrap();
        assert_eq!(restored, history);
        let record = &restored.records()[0];
        assert_eq!(record.location, "12 High Street");
        assert_eq!(record.store_id, Some(4421));
        assert_eq!(record.quantity, Some(3));
        assert!(record.available);
    }

    #[test]
    fn snapshot_batch_shares_one_stamp() {
        let sizes = vec![SizeStock::online("S", 1, true), SizeStock::online("M", 2, false)];
        let batch = batch_from_snapshot(42, "stamp", &sizes);
        assert_eq!(batch.len(), 2);
        assert!(batch.iter().all(|record| record.timestamp == 42));
        assert_eq!(batch[0].location, "online");
        assert!(!batch[1].available);
    }
}
