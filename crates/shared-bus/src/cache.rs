//! # Shared Key/Value Cache
//!
//! The volatile key/value side of the bus client. Values are stored as JSON
//! strings so that any bus backend holding plain strings can serve them;
//! `TypedCache` adds the typed get/set on top.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::CacheError;
use tracing::trace;

/// Raw string key/value operations offered by the bus backend.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: String) -> Result<(), CacheError>;

    /// Remove a key. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;
}

/// Typed JSON access to any `CacheStore`.
#[async_trait]
pub trait TypedCache: CacheStore {
    /// Read and decode a value.
    async fn get_typed<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let Some(raw) = self.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| CacheError::Serialization {
                key: key.to_owned(),
                reason: e.to_string(),
            })
    }

    /// Encode and write a value.
    async fn set_typed<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let raw = serde_json::to_string(value).map_err(|e| CacheError::Serialization {
            key: key.to_owned(),
            reason: e.to_string(),
        })?;
        self.set(key, raw).await
    }
}

impl<C: CacheStore + ?Sized> TypedCache for C {}

/// Process-local cache backed by a concurrent map.
///
/// No TTL and no eviction: entries live until deleted or the process exits.
#[derive(Default)]
pub struct InMemoryCache {
    entries: DashMap<String, String>,
}

impl InMemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let value = self.entries.get(key).map(|v| v.value().clone());
        trace!(key, hit = value.is_some(), "cache get");
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        trace!(key, "cache set");
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        trace!(key, "cache delete");
        Ok(self.entries.remove(key).is_some())
    }
}
