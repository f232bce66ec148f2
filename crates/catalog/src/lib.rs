//! The catalog index for hemwatch.
//!
//! One `catalog.csv` at the library root summarises every tracked item:
//! where its files live, when it was first and last observed, and its user
//! flags. The index is pure derived state — the item files are the truth,
//! and a [stock take](stock_take) rebuilds the index from them at any time.
//!
//! Day to day, the index changes through [`add_item`] and the sequential
//! bulk refresh [`update_all`]; both persist the index before finishing.

pub mod error;
mod index;
mod ops;
mod row;
mod stock_take;

pub use crate::index::{CATALOG_FILE, Catalog};
pub use crate::ops::{AddOutcome, UpdateEvent, UpdateFilter, add_item, jittered_delay, update_all};
pub use crate::row::{CATALOG_COLUMNS, CatalogRow};
pub use crate::stock_take::{StockTakeEvent, stock_take};
