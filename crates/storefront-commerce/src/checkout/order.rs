//! Completed orders and the local order history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_kv::{cache_key, Cache};

use crate::cart::{CartLineItem, OrderTotals};
use crate::checkout::{PaymentMethod, ShippingAddress};
use crate::error::PersistenceError;
use crate::ids::{OrderId, ProductId, UserId};
use crate::money::Money;
use crate::session::Session;

/// A paid order, as kept for order-history and order-detail views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletedOrder {
    /// Order identifier.
    pub order_id: OrderId,
    /// Buyer.
    pub user_id: UserId,
    /// Amount charged.
    pub amount: Money,
    /// Full breakdown of the amount.
    pub totals: OrderTotals,
    /// How it was paid.
    pub method: PaymentMethod,
    /// Purchased lines.
    pub items: Vec<CartLineItem>,
    /// Where it ships.
    pub shipping_address: ShippingAddress,
    /// When payment completed.
    pub completed_at: DateTime<Utc>,
}

impl CompletedOrder {
    /// Total units purchased.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.qty).sum()
    }

    /// Products purchased.
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.items.iter().map(|i| i.id).collect()
    }
}

/// Completed orders for one user, newest first.
#[derive(Debug, Clone)]
pub struct OrderHistory {
    cache: Cache,
    key: String,
}

impl OrderHistory {
    /// Open the history belonging to `session`.
    pub fn new(cache: Cache, session: &Session) -> Self {
        Self {
            cache,
            key: cache_key!("orders", session.scope()),
        }
    }

    /// Append a completed order.
    pub fn record(&self, order: CompletedOrder) -> Result<(), PersistenceError> {
        let mut orders = self.list()?;
        orders.retain(|o| o.order_id != order.order_id);
        orders.insert(0, order);
        self.cache
            .set(&self.key, &orders)
            .map_err(|e| PersistenceError::from_cache(&self.key, e))
    }

    /// All completed orders, newest first.
    pub fn list(&self) -> Result<Vec<CompletedOrder>, PersistenceError> {
        self.cache
            .get::<Vec<CompletedOrder>>(&self.key)
            .map(Option::unwrap_or_default)
            .map_err(|e| PersistenceError::from_cache(&self.key, e))
    }

    /// Look up one order.
    pub fn get(&self, order_id: &OrderId) -> Result<Option<CompletedOrder>, PersistenceError> {
        Ok(self.list()?.into_iter().find(|o| &o.order_id == order_id))
    }
}
