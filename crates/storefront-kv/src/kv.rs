//! Typed wrapper over a [`KvStore`] with automatic JSON serialization.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::{CacheError, KvStore};

/// Type-safe cache over any [`KvStore`] backend.
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`. Cloning is cheap; clones share the
/// same backend.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn KvStore>,
}

impl Cache {
    /// Wrap a backend.
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist, and
    /// [`CacheError::SerializeError`] if the stored bytes don't decode as `T`.
    ///
    /// ```rust,ignore
    /// let cart: Option<Vec<CartLineItem>> = cache.get("cart:user123")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.store.get(key)? {
            Some(bytes) => {
                let value: T = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a value in the cache.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.store.set(key, &bytes)
    }

    /// Delete a value from the cache.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.delete(key)
    }

    /// Check if a key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.store.exists(key)
    }

    /// Get all keys in the cache.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.store.keys()
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

/// Helper to build cache keys with namespacing.
///
/// ```rust
/// use storefront_kv::cache_key;
///
/// let key = cache_key!("cart", "user123");
/// assert_eq!(key, "cart:user123");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Line {
        id: u64,
        qty: i64,
    }

    fn cache() -> Cache {
        Cache::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_set_and_get_typed() {
        let cache = cache();
        let lines = vec![Line { id: 1, qty: 2 }];
        cache.set("cart:u1", &lines).unwrap();

        let loaded: Option<Vec<Line>> = cache.get("cart:u1").unwrap();
        assert_eq!(loaded, Some(lines));
    }

    #[test]
    fn test_get_missing_is_none() {
        let loaded: Option<Vec<Line>> = cache().get("missing").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_corrupt_value_is_serialize_error() {
        let store = Arc::new(MemoryStore::new());
        store.set("cart:u1", b"{not json").unwrap();
        let cache = Cache::new(store);

        let err = cache.get::<Vec<Line>>("cart:u1").unwrap_err();
        assert!(err.is_corrupt_value());
    }

    #[test]
    fn test_cache_key_macro() {
        assert_eq!(cache_key!("orders", "u1"), "orders:u1");
        assert_eq!(cache_key!("a", 1, "b"), "a:1:b");
    }
}
