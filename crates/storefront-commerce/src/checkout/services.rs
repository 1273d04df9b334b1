//! Backend collaborators the checkout talks to.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::{CartLineItem, OrderTotals};
use crate::checkout::{PaymentMethod, ShippingAddress};
use crate::ids::{OrderId, UserId};
use crate::money::Money;

/// Failure reported by a backend collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// The service answered with an error.
    #[error("{service} rejected the request: {message}")]
    Rejected {
        service: &'static str,
        message: String,
    },

    /// The service could not be reached.
    #[error("{service} unavailable: {message}")]
    Unavailable {
        service: &'static str,
        message: String,
    },
}

/// Order creation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewOrder {
    /// Client-generated order id.
    pub order_id: OrderId,
    /// Buyer.
    pub user_id: UserId,
    /// Lines being purchased.
    pub items: Vec<CartLineItem>,
    /// Totals at initiation; `totals.grand_total` is the amount charged.
    pub totals: OrderTotals,
    /// Chosen payment method.
    pub method: PaymentMethod,
    /// Where to ship.
    pub shipping_address: ShippingAddress,
}

/// Acknowledgement of a created order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderReceipt {
    /// Id under which the backend stored the order.
    pub order_id: OrderId,
}

/// Order backend.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Create an order in the created-but-unpaid state.
    async fn create_order(&self, order: NewOrder) -> Result<OrderReceipt, ServiceError>;

    /// Cancel an order that was never paid.
    async fn cancel_order(&self, order_id: &OrderId) -> Result<(), ServiceError>;
}

/// User-profile backend, as far as the wallet is concerned.
#[async_trait]
pub trait WalletService: Send + Sync {
    /// Current wallet balance for `user_id`.
    async fn wallet_balance(&self, user_id: &UserId) -> Result<Money, ServiceError>;
}
