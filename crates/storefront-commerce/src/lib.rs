//! Storefront domain types and logic.
//!
//! This crate holds the client-side core of a storefront:
//!
//! - **Cart**: the persisted, per-user cart store and order totals
//! - **Catalog**: stock levels used to clamp cart quantities
//! - **Checkout**: payment orchestration and the order history
//!
//! Persistence goes through [`storefront_kv::Cache`]; backends and the
//! payment gateway are traits the caller provides.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use storefront_commerce::prelude::*;
//! use storefront_kv::{Cache, MemoryStore};
//!
//! let cache = Cache::new(Arc::new(MemoryStore::new()));
//! let session = Session::login(UserId::new("u-1"), "ada");
//! let cart = CartStore::new(cache, &session);
//!
//! cart.add_item(ProductId::new(1), "Mug", Money::new(1000, Currency::USD), 2, None);
//!
//! let totals = cart.totals(&PricingConfig::default()).unwrap();
//! assert_eq!(totals.grand_total.amount_cents, 2680);
//! ```

pub mod error;
pub mod ids;
pub mod money;
pub mod session;

pub mod cart;
pub mod catalog;
pub mod checkout;

pub use error::{CommerceError, PersistenceError};
pub use ids::*;
pub use money::{Currency, Money};
pub use session::Session;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{CommerceError, PersistenceError};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};
    pub use crate::session::Session;

    // Cart
    pub use crate::cart::{
        compute_totals, CartLineItem, CartSnapshot, CartStore, OrderTotals, PricingConfig,
    };

    // Catalog
    pub use crate::catalog::{
        clamp_addition, clamp_quantity, Catalog, CatalogProduct, InventoryLevel, StockLookup,
    };

    // Checkout
    pub use crate::checkout::{
        CheckoutAttempt, CheckoutError, CheckoutOptions, CheckoutOrchestrator, CheckoutOutcome,
        CheckoutState, CompletedOrder, GatewayError, GatewayMode, NewOrder, OrderHistory,
        OrderReceipt, OrderService, PaymentGateway, PaymentMethod, PaymentReceipt, PaymentStatus,
        ServiceError, ShippingAddress, SimulatedGateway, WalletService,
    };
}
