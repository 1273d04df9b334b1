//! Product catalog module.
//!
//! Stock levels and the lookup callers use to clamp cart quantities before
//! touching the cart store.

mod inventory;
mod product;

pub use inventory::{clamp_addition, clamp_quantity, InventoryLevel, StockLookup};
pub use product::{Catalog, CatalogProduct};
