use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Where a stock observation was made.
///
/// The online shop is a location like any physical store; history rows
/// record the location's human-readable label in one column and the store
/// id (online: none) in another.
#[derive(Debug, Display, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    #[display("online")]
    Online,
    /// A physical store, identified by the retailer's store id and labelled
    /// with its address from the [`StoreDirectory`](crate::StoreDirectory).
    #[display("{address}")]
    Store { id: u64, address: String },
}

impl Location {
    pub fn store_id(&self) -> Option<u64> {
        match self {
            Self::Online => None,
            Self::Store { id, .. } => Some(*id),
        }
    }
}

/// One (location, size) stock fact captured at a fetch instant.
///
/// A full availability snapshot is a `Vec<SizeStock>`: one entry per size
/// the online shop declares, plus one entry per (store, size) pair any
/// physical store reported. Online entries carry no quantity — the shop
/// only says in stock or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeStock {
    pub location: Location,
    pub size: String,
    /// The retailer's internal size id, when known.
    pub size_id: Option<u64>,
    pub available: bool,
    /// Unit count, only reported by physical stores.
    pub quantity: Option<u32>,
}

impl SizeStock {
    /// An online-shop stock fact (no store id, no quantity).
    pub fn online(size: impl Into<String>, size_id: impl Into<Option<u64>>, available: bool) -> Self {
        Self {
            location: Location::Online,
            size: size.into(),
            size_id: size_id.into(),
            available,
            quantity: None,
        }
    }

    /// A physical-store stock fact; availability is derived from quantity.
    pub fn in_store(
        store_id: u64,
        address: impl Into<String>,
        size: impl Into<String>,
        size_id: impl Into<Option<u64>>,
        quantity: u32,
    ) -> Self {
        Self {
            location: Location::Store { id: store_id, address: address.into() },
            size: size.into(),
            size_id: size_id.into(),
            available: quantity > 0,
            quantity: Some(quantity),
        }
    }
}
