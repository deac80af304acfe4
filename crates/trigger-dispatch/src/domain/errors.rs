//! Error types for Trigger Dispatch

use shared_types::{CacheError, StoreError};
use thiserror::Error;

/// Errors that abort the dispatch of a single event
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The command's token could not be turned into a tenant context
    #[error("Cannot retrieve base from token: {0}")]
    Context(#[from] ContextError),

    /// The durable function store failed on a cache miss
    #[error("Error getting functions by trigger: {0}")]
    Store(#[from] StoreError),

    /// The shared cache failed an explicit operation
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Context resolution failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("No database for account {0}")]
    UnknownAccount(String),
}

/// Failure reported by the execution runtime for one function
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Function code is invalid: {0}")]
    InvalidCode(String),

    #[error("Function raised an error: {0}")]
    Runtime(String),

    #[error("Execution task aborted: {0}")]
    Aborted(String),
}

/// Configuration validation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("System topic must not be empty")]
    EmptySystemTopic,

    #[error("Rate limit must allow at least one event per window")]
    ZeroRateLimit,

    #[error("Rate limit window must be at least one second")]
    ZeroWindow,

    #[error("Function cache key prefix must not be empty")]
    EmptyKeyPrefix,
}
