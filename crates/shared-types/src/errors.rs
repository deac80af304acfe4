//! # Error Types
//!
//! Errors raised by the external collaborators the dispatcher talks to.

use thiserror::Error;

/// Errors from the shared key/value cache.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    /// Value could not be encoded or decoded.
    #[error("Cache serialization failed for key {key}: {reason}")]
    Serialization { key: String, reason: String },

    /// The backing cache rejected or failed the operation.
    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// Errors from the durable function store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The tenant database does not exist.
    #[error("Unknown tenant: {0}")]
    UnknownTenant(String),

    /// The query against the store failed.
    #[error("Database error: {0}")]
    DatabaseError(String),
}
