//! Shopping cart module.
//!
//! Contains the persisted cart store, its line items, and order totals.

mod line_item;
mod pricing;
mod store;

pub use line_item::{CartLineItem, CartSnapshot};
pub use pricing::{compute_totals, OrderTotals, PricingConfig};
pub use store::CartStore;
