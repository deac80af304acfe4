//! Trigger Cache
//!
//! Read-through cache answering "which functions listen on this channel".
//!
//! ## Keys
//!
//! | Key | Value |
//! |-----|-------|
//! | `<tenant>:<channel>` | JSON list of function ids |
//! | `fn_<id>` | JSON `ExecData` |
//!
//! Entries never expire. A populated index stays authoritative until it is
//! evicted from the shared cache or dropped through [`TriggerCache::invalidate`].

use crate::domain::errors::DispatchError;
use crate::ports::outbound::FunctionStore;
use shared_bus::{CacheStore, TypedCache};
use shared_types::{CacheError, ExecData, FunctionId};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Default prefix of per-function keys.
pub const FUNCTION_KEY_PREFIX: &str = "fn_";

pub struct TriggerCache {
    cache: Arc<dyn CacheStore>,
    store: Arc<dyn FunctionStore>,
    function_key_prefix: String,
}

impl TriggerCache {
    pub fn new(cache: Arc<dyn CacheStore>, store: Arc<dyn FunctionStore>) -> Self {
        Self::with_prefix(cache, store, FUNCTION_KEY_PREFIX)
    }

    pub fn with_prefix(
        cache: Arc<dyn CacheStore>,
        store: Arc<dyn FunctionStore>,
        function_key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            cache,
            store,
            function_key_prefix: function_key_prefix.into(),
        }
    }

    /// Key of the trigger index of `channel` in tenant `base_name`.
    pub fn index_key(base_name: &str, channel: &str) -> String {
        format!("{base_name}:{channel}")
    }

    /// Key of the cached definition of one function.
    pub fn function_key(&self, function_id: &str) -> String {
        format!("{}{}", self.function_key_prefix, function_id)
    }

    /// Functions of tenant `base_name` listening on `channel`.
    ///
    /// Served from the cache when the index and every function it names are
    /// present. Otherwise the durable store is queried once and the cache is
    /// refilled.
    ///
    /// # Errors
    ///
    /// `DispatchError::Store` when the durable store fails on a miss. Cache
    /// failures are logged and never returned.
    pub async fn resolve(
        &self,
        base_name: &str,
        channel: &str,
    ) -> Result<Vec<ExecData>, DispatchError> {
        let index_key = Self::index_key(base_name, channel);

        if let Some(functions) = self.load_cached(&index_key).await {
            debug!(key = %index_key, count = functions.len(), "Trigger cache hit");
            return Ok(functions);
        }

        debug!(key = %index_key, "Trigger cache miss");
        self.load_from_store(base_name, channel, &index_key).await
    }

    /// Read the index and every function it names.
    ///
    /// `None` means the caller must go to the store: the index is absent,
    /// unreadable, or names a function that is no longer cached.
    async fn load_cached(&self, index_key: &str) -> Option<Vec<ExecData>> {
        let ids: Vec<FunctionId> = match self.cache.get_typed(index_key).await {
            Ok(Some(ids)) => ids,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %index_key, error = %e, "Trigger index unreadable, reloading");
                return None;
            }
        };

        let mut functions = Vec::with_capacity(ids.len());
        for id in &ids {
            let key = self.function_key(id);
            let cached: Result<Option<ExecData>, CacheError> = self.cache.get_typed(&key).await;
            match cached {
                Ok(Some(function)) => functions.push(function),
                Ok(None) => {
                    warn!(key = %index_key, function_id = %id, "Cached function missing, reloading");
                    return None;
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Cached function unreadable, reloading");
                    return None;
                }
            }
        }
        Some(functions)
    }

    async fn load_from_store(
        &self,
        base_name: &str,
        channel: &str,
        index_key: &str,
    ) -> Result<Vec<ExecData>, DispatchError> {
        let functions = self
            .store
            .list_functions_by_trigger(base_name, channel)
            .await?;

        // The index is only written once every function it names is cached,
        // otherwise the next resolve would hit an incomplete index.
        let mut complete = true;
        for function in &functions {
            let key = self.function_key(&function.id);
            if let Err(e) = self.cache.set_typed(&key, function).await {
                error!(
                    key = %key,
                    function = %function.function_name,
                    error = %e,
                    "Cannot cache function"
                );
                complete = false;
            }
        }

        if complete {
            let ids: Vec<&str> = functions.iter().map(|f| f.id.as_str()).collect();
            if let Err(e) = self.cache.set_typed(index_key, &ids).await {
                error!(key = %index_key, error = %e, "Cannot cache trigger index");
            }
        }

        Ok(functions)
    }

    /// Drop the trigger index of `channel` in tenant `base_name`.
    ///
    /// Returns whether an index was cached.
    pub async fn invalidate(&self, base_name: &str, channel: &str) -> Result<bool, CacheError> {
        let key = Self::index_key(base_name, channel);
        let existed = self.cache.delete(&key).await?;
        debug!(key = %key, existed, "Trigger index invalidated");
        Ok(existed)
    }

    /// Drop the cached definition of one function.
    ///
    /// Any index naming it reloads from the store on its next resolve.
    pub async fn invalidate_function(&self, function_id: &str) -> Result<bool, CacheError> {
        let key = self.function_key(function_id);
        let existed = self.cache.delete(&key).await?;
        debug!(key = %key, existed, "Function definition invalidated");
        Ok(existed)
    }
}
