//! Cart line items.

use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// One product's entry in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLineItem {
    /// Product being purchased. At most one line per product.
    pub id: ProductId,
    /// Product name (denormalized for display).
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Quantity, always at least 1.
    pub qty: i64,
    /// Whether the line takes part in the next checkout.
    #[serde(default = "default_selected")]
    pub selected: bool,
    /// Display image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

fn default_selected() -> bool {
    true
}

impl CartLineItem {
    /// Create a new, selected line item.
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: Money,
        qty: i64,
        image: Option<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            qty,
            selected: true,
            image,
        }
    }

    /// `price * qty`.
    pub fn line_total(&self) -> Result<Money, CommerceError> {
        self.price.try_multiply(self.qty)
    }
}

/// The ordered collection of cart lines, as persisted.
///
/// Serializes as a plain JSON array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct CartSnapshot {
    /// Lines in insertion order.
    pub items: Vec<CartLineItem>,
}

impl CartSnapshot {
    /// Get a line by product.
    pub fn get(&self, id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: ProductId) -> Option<&mut CartLineItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Lines flagged for checkout.
    pub fn selected(&self) -> impl Iterator<Item = &CartLineItem> {
        self.items.iter().filter(|i| i.selected)
    }

    /// Sum of quantities over all lines.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.qty).sum()
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
