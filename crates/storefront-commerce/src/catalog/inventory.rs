//! Inventory levels and stock clamping.

use crate::ids::ProductId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Inventory level for a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct InventoryLevel {
    /// Total quantity in stock.
    pub quantity: i64,
    /// Quantity reserved for pending orders.
    #[serde(default)]
    pub reserved: i64,
    /// Whether to track inventory for this item.
    #[serde(default = "default_track")]
    pub track_inventory: bool,
}

fn default_track() -> bool {
    true
}

impl InventoryLevel {
    /// Create a new inventory level with tracking enabled.
    pub fn new(quantity: i64) -> Self {
        Self {
            quantity,
            reserved: 0,
            track_inventory: true,
        }
    }

    /// Create an inventory level with no tracking (infinite stock).
    pub fn untracked() -> Self {
        Self {
            quantity: 0,
            reserved: 0,
            track_inventory: false,
        }
    }

    /// Available quantity, or `None` when stock is not tracked.
    pub fn available(&self) -> Option<i64> {
        self.track_inventory
            .then(|| (self.quantity - self.reserved).max(0))
    }

    /// Check if out of stock.
    pub fn is_out_of_stock(&self) -> bool {
        self.available() == Some(0)
    }
}

/// Supplies current stock per product.
#[async_trait]
pub trait StockLookup: Send + Sync {
    /// Units available for `product_id`. `None` means unknown product or
    /// untracked stock.
    async fn available(&self, product_id: ProductId) -> Option<i64>;
}

/// Clamp a requested line quantity into `0..=available`.
///
/// With no known stock the request passes through unchanged.
pub fn clamp_quantity(requested: i64, available: Option<i64>) -> i64 {
    match available {
        Some(limit) => requested.min(limit.max(0)).max(0),
        None => requested.max(0),
    }
}

/// How many more units may be added to a line already holding `in_cart`.
pub fn clamp_addition(in_cart: i64, requested: i64, available: Option<i64>) -> i64 {
    match available {
        Some(limit) => requested.min(limit - in_cart).max(0),
        None => requested.max(0),
    }
}
