//! Local stand-ins for the order and user-profile backends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_commerce::checkout::{
    NewOrder, OrderReceipt, OrderService, ServiceError, WalletService,
};
use storefront_commerce::{Money, OrderId, UserId};
use storefront_kv::{cache_key, Cache};

const ORDERS: &str = "orders";

/// Lifecycle of an order on the local backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendOrderStatus {
    Created,
    Cancelled,
}

/// Order as the local backend stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendOrder {
    pub order: NewOrder,
    pub status: BackendOrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Order backend persisting into the same data directory as the cart.
#[derive(Debug, Clone)]
pub struct LocalOrderService {
    cache: Cache,
}

impl LocalOrderService {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    fn key(order_id: &OrderId) -> String {
        cache_key!("backend", ORDERS, order_id.as_str())
    }

    /// Look up a stored order.
    pub fn get(&self, order_id: &OrderId) -> Result<Option<BackendOrder>, ServiceError> {
        self.cache
            .get(&Self::key(order_id))
            .map_err(|e| unavailable(e.to_string()))
    }
}

fn unavailable(message: String) -> ServiceError {
    ServiceError::Unavailable {
        service: "orders",
        message,
    }
}

#[async_trait]
impl OrderService for LocalOrderService {
    async fn create_order(&self, order: NewOrder) -> Result<OrderReceipt, ServiceError> {
        let key = Self::key(&order.order_id);
        if self
            .cache
            .exists(&key)
            .map_err(|e| unavailable(e.to_string()))?
        {
            return Err(ServiceError::Rejected {
                service: "orders",
                message: format!("order {} already exists", order.order_id),
            });
        }

        let order_id = order.order_id.clone();
        let stored = BackendOrder {
            order,
            status: BackendOrderStatus::Created,
            created_at: Utc::now(),
        };
        self.cache
            .set(&key, &stored)
            .map_err(|e| unavailable(e.to_string()))?;
        tracing::debug!(order_id = %order_id, "order stored");
        Ok(OrderReceipt { order_id })
    }

    async fn cancel_order(&self, order_id: &OrderId) -> Result<(), ServiceError> {
        let key = Self::key(order_id);
        let Some(mut stored) = self.get(order_id)? else {
            return Err(ServiceError::Rejected {
                service: "orders",
                message: format!("order {} not found", order_id),
            });
        };
        stored.status = BackendOrderStatus::Cancelled;
        self.cache
            .set(&key, &stored)
            .map_err(|e| unavailable(e.to_string()))
    }
}

/// Wallet reporting the balance from `[wallet]`.
#[derive(Debug, Clone, Copy)]
pub struct ConfiguredWallet {
    balance: Money,
}

impl ConfiguredWallet {
    pub fn new(balance: Money) -> Self {
        Self { balance }
    }
}

#[async_trait]
impl WalletService for ConfiguredWallet {
    async fn wallet_balance(&self, user_id: &UserId) -> Result<Money, ServiceError> {
        tracing::debug!(%user_id, balance = %self.balance, "wallet balance");
        Ok(self.balance)
    }
}
