//! Canonical Column Schemas
//!
//! History files on disk may predate the current column set, or carry columns
//! in a different order. Rather than rejecting such files, rows are reindexed
//! against the canonical schema by header name: missing columns become empty
//! fields, unknown columns are dropped, and order is normalised.

/// Columns of a price history file, in canonical order.
pub const PRICE_COLUMNS: [&str; 3] = ["timestamp", "human_timestamp", "price"];

/// Columns of an availability history file, in canonical order.
///
/// Older files carried only `timestamp, human_timestamp, size, available`;
/// reindexing widens them so location-aware rows and legacy rows can live in
/// the same table.
pub const AVAILABILITY_COLUMNS: [&str; 8] = [
    "timestamp",
    "human_timestamp",
    "location",
    "store_id",
    "size",
    "size_id",
    "available",
    "quantity",
];

/// Reorder `rows` from the layout described by `header` into `columns` order.
pub fn reindex(header: &[String], rows: Vec<Vec<String>>, columns: &[&str]) -> Vec<Vec<String>> {
    let positions: Vec<Option<usize>> = columns
        .iter()
        .map(|col| header.iter().position(|have| have == col))
        .collect();
    rows.into_iter()
        .map(|row| {
            positions
                .iter()
                .map(|pos| pos.and_then(|idx| row.get(idx).cloned()).unwrap_or_default())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reorders_shuffled_columns() {
        let header = strings(&["price", "timestamp", "human_timestamp"]);
        let rows = vec![strings(&["19.95", "1700000000", "2023-11-14T22:13:20Z"])];
        let fixed = reindex(&header, rows, &PRICE_COLUMNS);
        assert_eq!(fixed[0], strings(&["1700000000", "2023-11-14T22:13:20Z", "19.95"]));
    }

    #[test]
    fn widens_legacy_availability_rows() {
        let header = strings(&["timestamp", "human_timestamp", "size", "available"]);
        let rows = vec![strings(&["1700000000", "2023-11-14T22:13:20Z", "M", "true"])];
        let fixed = reindex(&header, rows, &AVAILABILITY_COLUMNS);
        assert_eq!(
            fixed[0],
            strings(&["1700000000", "2023-11-14T22:13:20Z", "", "", "M", "", "true", ""])
        );
    }

    #[test]
    fn drops_unknown_columns() {
        let header = strings(&["timestamp", "human_timestamp", "price", "currency"]);
        let rows = vec![strings(&["1", "t", "9.99", "EUR"])];
        let fixed = reindex(&header, rows, &PRICE_COLUMNS);
        assert_eq!(fixed[0], strings(&["1", "t", "9.99"]));
    }
}
