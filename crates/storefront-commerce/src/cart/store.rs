//! The persisted cart store.

use std::collections::HashSet;

use storefront_kv::{cache_key, Cache};

use crate::cart::{compute_totals, CartLineItem, CartSnapshot, OrderTotals, PricingConfig};
use crate::error::{CommerceError, PersistenceError};
use crate::ids::ProductId;
use crate::money::Money;
use crate::session::Session;

/// Single source of truth for a shopper's cart.
///
/// The store keeps no in-memory copy: every call reads the persisted lines,
/// and every mutation reads, modifies and writes them inside one synchronous
/// call. Storage failures during mutations are logged and swallowed, so a
/// write that failed is simply not visible to the next read.
#[derive(Debug, Clone)]
pub struct CartStore {
    cache: Cache,
    key: String,
}

impl CartStore {
    /// Open the cart belonging to `session`.
    pub fn new(cache: Cache, session: &Session) -> Self {
        Self {
            cache,
            key: cache_key!("cart", session.scope()),
        }
    }

    /// Storage key holding this cart.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the persisted cart.
    ///
    /// Unlike [`CartStore::list`], this distinguishes an empty cart from a
    /// storage failure or an undecodable stored value.
    pub fn snapshot(&self) -> Result<CartSnapshot, PersistenceError> {
        self.cache
            .get::<CartSnapshot>(&self.key)
            .map(Option::unwrap_or_default)
            .map_err(|e| PersistenceError::from_cache(&self.key, e))
    }

    /// Current lines in insertion order. Empty when storage fails.
    pub fn list(&self) -> Vec<CartLineItem> {
        self.read_or_empty().items
    }

    /// Lines flagged for checkout.
    pub fn selected_items(&self) -> Vec<CartLineItem> {
        self.read_or_empty()
            .items
            .into_iter()
            .filter(|i| i.selected)
            .collect()
    }

    /// Sum of quantities over all lines.
    pub fn item_count(&self) -> i64 {
        self.read_or_empty().item_count()
    }

    /// Number of selected lines.
    pub fn selected_count(&self) -> usize {
        self.read_or_empty().selected().count()
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.read_or_empty().is_empty()
    }

    /// Totals over the currently selected lines.
    pub fn totals(&self, config: &PricingConfig) -> Result<OrderTotals, CommerceError> {
        compute_totals(&self.read_or_empty().items, config)
    }

    /// Add `qty` of a product.
    ///
    /// Merges into the existing line for `product_id` by increasing its
    /// quantity, otherwise appends a new selected line. Stock limits are the
    /// caller's concern.
    pub fn add_item(
        &self,
        product_id: ProductId,
        name: impl Into<String>,
        price: Money,
        qty: i64,
        image: Option<String>,
    ) {
        if qty <= 0 {
            tracing::warn!(%product_id, qty, "ignoring add with non-positive quantity");
            return;
        }
        if price.is_negative() {
            tracing::warn!(%product_id, price = %price, "ignoring add with negative price");
            return;
        }

        let name = name.into();
        self.mutate("add_item", |cart| {
            if let Some(existing) = cart.get_mut(product_id) {
                existing.qty = existing.qty.saturating_add(qty);
            } else {
                cart.items
                    .push(CartLineItem::new(product_id, name, price, qty, image));
            }
            true
        });
    }

    /// Set a line's quantity. `qty <= 0` removes the line.
    pub fn update_quantity(&self, product_id: ProductId, qty: i64) {
        if qty <= 0 {
            self.remove_item(product_id);
            return;
        }

        self.mutate("update_quantity", |cart| match cart.get_mut(product_id) {
            Some(line) => {
                line.qty = qty;
                true
            }
            None => false,
        });
    }

    /// Delete a line. No-op if absent.
    pub fn remove_item(&self, product_id: ProductId) {
        self.mutate("remove_item", |cart| {
            let before = cart.items.len();
            cart.items.retain(|i| i.id != product_id);
            cart.items.len() != before
        });
    }

    /// Flag one line for (or exclude it from) checkout.
    pub fn set_selected(&self, product_id: ProductId, selected: bool) {
        self.mutate("set_selected", |cart| match cart.get_mut(product_id) {
            Some(line) if line.selected != selected => {
                line.selected = selected;
                true
            }
            _ => false,
        });
    }

    /// Flag every line.
    pub fn set_all_selected(&self, selected: bool) {
        self.mutate("set_all_selected", |cart| {
            let mut changed = false;
            for line in cart.items.iter_mut().filter(|l| l.selected != selected) {
                line.selected = selected;
                changed = true;
            }
            changed
        });
    }

    /// Remove every line whose product was part of a completed purchase.
    /// Ids not in the cart are ignored.
    pub fn remove_purchased(&self, product_ids: &[ProductId]) {
        let purchased: HashSet<ProductId> = product_ids.iter().copied().collect();
        self.mutate("remove_purchased", |cart| {
            let before = cart.items.len();
            cart.items.retain(|i| !purchased.contains(&i.id));
            cart.items.len() != before
        });
    }

    /// Empty the cart.
    pub fn clear(&self) {
        if let Err(e) = self.cache.delete(&self.key) {
            tracing::warn!(key = %self.key, error = %e, "failed to clear cart");
        } else {
            tracing::debug!(key = %self.key, "cart cleared");
        }
    }

    fn read_or_empty(&self) -> CartSnapshot {
        self.snapshot().unwrap_or_else(|e| {
            tracing::warn!(key = %self.key, error = %e, "cart unreadable, treating as empty");
            CartSnapshot::default()
        })
    }

    /// Read-modify-write. `apply` returns whether it changed anything.
    fn mutate<F>(&self, op: &'static str, apply: F)
    where
        F: FnOnce(&mut CartSnapshot) -> bool,
    {
        let mut cart = match self.snapshot() {
            Ok(cart) => cart,
            Err(e @ PersistenceError::Corrupt { .. }) => {
                tracing::warn!(op, error = %e, "discarding corrupt cart");
                CartSnapshot::default()
            }
            Err(e) => {
                tracing::warn!(op, error = %e, "cart mutation skipped");
                return;
            }
        };

        if !apply(&mut cart) {
            tracing::debug!(op, "cart unchanged");
            return;
        }

        match self.cache.set(&self.key, &cart) {
            Ok(()) => tracing::debug!(op, lines = cart.items.len(), "cart saved"),
            Err(e) => tracing::warn!(op, error = %e, "failed to persist cart"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::UserId;
    use crate::money::Currency;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use storefront_kv::{CacheError, KvStore, MemoryStore};

    fn session() -> Session {
        Session::login(UserId::new("u-1"), "alice")
    }

    fn store() -> CartStore {
        CartStore::new(Cache::new(Arc::new(MemoryStore::new())), &session())
    }

    fn usd(cents: i64) -> Money {
        Money::new(cents, Currency::USD)
    }

    /// Memory store whose writes can be switched off.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: AtomicBool,
        fail_reads: AtomicBool,
    }

    impl KvStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(CacheError::StoreError("read refused".to_string()));
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(CacheError::StoreError("quota exceeded".to_string()));
            }
            self.inner.set(key, value)
        }

        fn delete(&self, key: &str) -> Result<(), CacheError> {
            self.inner.delete(key)
        }

        fn keys(&self) -> Result<Vec<String>, CacheError> {
            self.inner.keys()
        }
    }

    #[test]
    fn test_add_same_product_merges() {
        let cart = store();
        cart.add_item(ProductId::new(7), "Lamp", usd(1000), 1, None);
        cart.add_item(ProductId::new(7), "Lamp", usd(1000), 3, None);

        let lines = cart.list();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].qty, 4);
        assert!(lines[0].selected);
    }

    #[test]
    fn test_repeated_adds_sum_quantities() {
        let cart = store();
        let adds = [2, 5, 1, 9];
        for qty in adds {
            cart.add_item(ProductId::new(3), "Pen", usd(150), qty, None);
        }

        let lines = cart.list();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].qty, adds.iter().sum::<i64>());
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let cart = store();
        cart.add_item(ProductId::new(2), "B", usd(1), 1, None);
        cart.add_item(ProductId::new(1), "A", usd(1), 1, None);
        cart.add_item(ProductId::new(2), "B", usd(1), 1, None);

        let ids: Vec<u64> = cart.list().iter().map(|l| l.id.get()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_non_positive_add_is_ignored() {
        let cart = store();
        cart.add_item(ProductId::new(1), "A", usd(100), 0, None);
        cart.add_item(ProductId::new(1), "A", usd(100), -2, None);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_to_zero_removes() {
        let cart = store();
        cart.add_item(ProductId::new(1), "A", usd(100), 3, None);

        cart.update_quantity(ProductId::new(1), 0);
        assert!(cart.list().iter().all(|l| l.id != ProductId::new(1)));
    }

    #[test]
    fn test_update_quantity_sets_directly() {
        let cart = store();
        cart.add_item(ProductId::new(1), "A", usd(100), 3, None);
        cart.update_quantity(ProductId::new(1), 8);
        assert_eq!(cart.list()[0].qty, 8);

        // Unknown product: nothing happens
        cart.update_quantity(ProductId::new(99), 2);
        assert_eq!(cart.list().len(), 1);
    }

    #[test]
    fn test_remove_item_absent_is_noop() {
        let cart = store();
        cart.add_item(ProductId::new(1), "A", usd(100), 1, None);
        cart.remove_item(ProductId::new(2));
        assert_eq!(cart.list().len(), 1);
        cart.remove_item(ProductId::new(1));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_deselect_removes_from_subtotal_but_keeps_line() {
        let cart = store();
        cart.add_item(ProductId::new(1), "A", usd(1000), 2, None);
        cart.add_item(ProductId::new(2), "B", usd(500), 1, None);

        cart.set_selected(ProductId::new(2), false);

        assert_eq!(cart.list().len(), 2);
        assert_eq!(cart.selected_count(), 1);
        let totals = cart.totals(&PricingConfig::default()).unwrap();
        assert_eq!(totals.subtotal.amount_cents, 2000);
        assert_eq!(totals.grand_total.amount_cents, 2680);
    }

    #[test]
    fn test_set_all_selected() {
        let cart = store();
        cart.add_item(ProductId::new(1), "A", usd(100), 1, None);
        cart.add_item(ProductId::new(2), "B", usd(100), 1, None);

        cart.set_all_selected(false);
        assert!(cart.selected_items().is_empty());

        cart.set_all_selected(true);
        assert_eq!(cart.selected_items().len(), 2);
        // Quantities untouched
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_remove_purchased_ignores_unknown_ids() {
        let cart = store();
        cart.add_item(ProductId::new(1), "A", usd(100), 1, None);
        cart.add_item(ProductId::new(2), "B", usd(100), 1, None);

        cart.remove_purchased(&[ProductId::new(1), ProductId::new(42)]);

        let ids: Vec<u64> = cart.list().iter().map(|l| l.id.get()).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_clear() {
        let cart = store();
        cart.add_item(ProductId::new(1), "A", usd(100), 1, None);
        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.snapshot().unwrap().is_empty());
    }

    #[test]
    fn test_carts_are_scoped_per_user() {
        let cache = Cache::new(Arc::new(MemoryStore::new()));
        let alice = CartStore::new(cache.clone(), &Session::login(UserId::new("a"), "alice"));
        let bob = CartStore::new(cache, &Session::login(UserId::new("b"), "bob"));

        alice.add_item(ProductId::new(1), "A", usd(100), 1, None);
        assert!(bob.is_empty());
        assert_eq!(alice.key(), "cart:a");
    }

    #[test]
    fn test_failed_write_is_invisible_to_reads() {
        let backend = Arc::new(FlakyStore::default());
        let cart = CartStore::new(Cache::new(backend.clone()), &session());
        cart.add_item(ProductId::new(1), "A", usd(100), 1, None);

        backend.fail_writes.store(true, Ordering::SeqCst);
        cart.add_item(ProductId::new(1), "A", usd(100), 5, None);
        cart.add_item(ProductId::new(2), "B", usd(100), 1, None);

        let lines = cart.list();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].qty, 1);
    }

    #[test]
    fn test_unavailable_storage_reads_as_empty_but_snapshot_errors() {
        let backend = Arc::new(FlakyStore::default());
        let cart = CartStore::new(Cache::new(backend.clone()), &session());
        cart.add_item(ProductId::new(1), "A", usd(100), 1, None);

        backend.fail_reads.store(true, Ordering::SeqCst);
        assert!(cart.list().is_empty());
        assert!(matches!(
            cart.snapshot(),
            Err(PersistenceError::Unavailable(_))
        ));
    }

    #[test]
    fn test_corrupt_value_degrades_to_empty() {
        let backend = Arc::new(MemoryStore::new());
        backend.set("cart:u-1", b"not json at all").unwrap();
        let cart = CartStore::new(Cache::new(backend), &session());

        assert!(cart.list().is_empty());
        assert!(matches!(cart.snapshot(), Err(PersistenceError::Corrupt { .. })));

        // The next mutation starts over from an empty cart
        cart.add_item(ProductId::new(1), "A", usd(100), 2, None);
        assert_eq!(cart.snapshot().unwrap().item_count(), 2);
    }
}
