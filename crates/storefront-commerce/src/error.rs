//! Commerce error types.

use storefront_kv::CacheError;
use thiserror::Error;

/// Errors from money arithmetic and input validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommerceError {
    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Failure of the storage collaborator.
///
/// Cart mutations swallow these (after logging); only explicit reads such as
/// `CartStore::snapshot` hand them to the caller.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The backend could not be read or written.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A stored value exists but does not decode.
    #[error("stored value under {key} is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}

impl PersistenceError {
    pub(crate) fn from_cache(key: &str, err: CacheError) -> Self {
        if err.is_corrupt_value() {
            PersistenceError::Corrupt {
                key: key.to_string(),
                reason: err.to_string(),
            }
        } else {
            PersistenceError::Unavailable(err.to_string())
        }
    }
}
