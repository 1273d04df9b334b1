//! Type-safe key-value storage layer for the storefront.
//!
//! Values are stored as JSON under string keys in a pluggable [`KvStore`]
//! backend. The in-memory backend serves tests; the file backend keeps data
//! on disk between runs.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use storefront_kv::{Cache, MemoryStore};
//!
//! let cache = Cache::new(Arc::new(MemoryStore::new()));
//!
//! cache.set("greeting", &"hello").unwrap();
//! let value: Option<String> = cache.get("greeting").unwrap();
//! assert_eq!(value.as_deref(), Some("hello"));
//!
//! cache.delete("greeting").unwrap();
//! assert!(!cache.exists("greeting").unwrap());
//! ```

mod error;
mod kv;
mod session;
mod store;

pub use error::CacheError;
pub use kv::Cache;
pub use session::{SessionData, SessionId, SessionStore};
pub use store::{FileStore, KvStore, MemoryStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, FileStore, KvStore, MemoryStore, SessionId, SessionStore};
}
