//! Catalog products and an in-memory catalog.

use std::collections::BTreeMap;

use crate::catalog::{InventoryLevel, StockLookup};
use crate::ids::ProductId;
use crate::money::Money;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A product as the storefront sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogProduct {
    /// Product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Stock level.
    pub inventory: InventoryLevel,
    /// Display image reference.
    #[serde(default)]
    pub image: Option<String>,
}

/// Products keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: BTreeMap<ProductId, CatalogProduct>,
}

impl Catalog {
    /// Build a catalog. Later duplicates replace earlier ones.
    pub fn new(products: impl IntoIterator<Item = CatalogProduct>) -> Self {
        Self {
            products: products.into_iter().map(|p| (p.id, p)).collect(),
        }
    }

    /// Look up a product.
    pub fn get(&self, id: ProductId) -> Option<&CatalogProduct> {
        self.products.get(&id)
    }

    /// All products ordered by id.
    pub fn products(&self) -> impl Iterator<Item = &CatalogProduct> {
        self.products.values()
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[async_trait]
impl StockLookup for Catalog {
    async fn available(&self, product_id: ProductId) -> Option<i64> {
        self.get(product_id).and_then(|p| p.inventory.available())
    }
}
