//! In-memory durable function store
//!
//! Stands in for the document database in single-node deployments and
//! tests. Functions are grouped per tenant database.

use crate::ports::outbound::FunctionStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{ExecData, FunctionId, StoreError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;
use uuid::Uuid;

/// Function definitions keyed by tenant, then by function id.
#[derive(Default)]
pub struct InMemoryFunctionStore {
    bases: RwLock<HashMap<String, HashMap<FunctionId, ExecData>>>,
    lookups: AtomicU64,
}

impl InMemoryFunctionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `base_name` a known tenant with no functions.
    pub fn create_base(&self, base_name: &str) {
        self.bases.write().entry(base_name.to_owned()).or_default();
    }

    /// Add or replace a function, returning its id.
    ///
    /// An empty id is replaced with a fresh UUID. Replacing an existing
    /// function bumps its version.
    pub fn register(&self, base_name: &str, mut function: ExecData) -> FunctionId {
        if function.id.is_empty() {
            function.id = Uuid::new_v4().to_string();
        }
        function.last_updated = now_secs();

        let mut bases = self.bases.write();
        let functions = bases.entry(base_name.to_owned()).or_default();
        if let Some(previous) = functions.get(&function.id) {
            function.version = previous.version + 1;
        }

        debug!(
            base = base_name,
            function_id = %function.id,
            trigger = %function.trigger_topic,
            "Function registered"
        );
        let id = function.id.clone();
        functions.insert(id.clone(), function);
        id
    }

    /// Remove a function.
    pub fn remove(&self, base_name: &str, function_id: &str) -> Option<ExecData> {
        self.bases
            .write()
            .get_mut(base_name)
            .and_then(|functions| functions.remove(function_id))
    }

    /// Fetch a function by id.
    pub fn get(&self, base_name: &str, function_id: &str) -> Option<ExecData> {
        self.bases
            .read()
            .get(base_name)
            .and_then(|functions| functions.get(function_id).cloned())
    }

    /// Number of `list_functions_by_trigger` calls served.
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl FunctionStore for InMemoryFunctionStore {
    async fn list_functions_by_trigger(
        &self,
        base_name: &str,
        channel: &str,
    ) -> Result<Vec<ExecData>, StoreError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);

        let bases = self.bases.read();
        let functions = bases
            .get(base_name)
            .ok_or_else(|| StoreError::UnknownTenant(base_name.to_owned()))?;

        let mut matched: Vec<ExecData> = functions
            .values()
            .filter(|f| f.trigger_topic == channel)
            .cloned()
            .collect();
        // Stable order for the cached index.
        matched.sort_by(|a, b| a.function_name.cmp(&b.function_name).then(a.id.cmp(&b.id)));
        Ok(matched)
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
