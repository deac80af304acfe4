//! # Node Container
//!
//! Owns every collaborator of the dispatcher and injects them through its
//! ports. All collaborators are in-process; swapping one for a networked
//! implementation only touches this module.

pub mod config;

pub use config::{NodeConfig, NodeConfigError, TenantBinding};

use shared_bus::{InMemoryCache, InMemoryEventBus};
use std::sync::Arc;
use tracing::info;
use trigger_dispatch::{
    DispatcherPorts, InMemoryFunctionStore, LoggingExecutor, PrimaryFlag, StaticContextResolver,
    TriggerDispatcher,
};

/// Wired collaborators of one node.
pub struct NodeContainer {
    pub config: NodeConfig,
    pub bus: Arc<InMemoryEventBus>,
    pub cache: Arc<InMemoryCache>,
    pub store: Arc<InMemoryFunctionStore>,
    pub resolver: Arc<StaticContextResolver>,
    pub executor: Arc<LoggingExecutor>,
    pub role: PrimaryFlag,
    pub dispatcher: Arc<TriggerDispatcher>,
}

impl NodeContainer {
    pub fn new(config: NodeConfig) -> Self {
        let bus = Arc::new(InMemoryEventBus::new());
        let cache = Arc::new(InMemoryCache::new());
        let store = Arc::new(InMemoryFunctionStore::new());
        let resolver = Arc::new(StaticContextResolver::new());
        let executor = Arc::new(LoggingExecutor::new());
        let role = PrimaryFlag::new(config.is_primary);

        // Environment tokens carry no separate account; the base names it.
        for tenant in &config.tenants {
            resolver.add_account(tenant.base_name.clone(), tenant.base_name.clone());
            resolver.add_token(tenant.token.clone(), tenant.base_name.clone());
            store.create_base(&tenant.base_name);
        }

        let dispatcher = Arc::new(TriggerDispatcher::new(
            config.dispatch.clone(),
            DispatcherPorts {
                bus: bus.clone(),
                cache: cache.clone(),
                store: store.clone(),
                resolver: resolver.clone(),
                executor: executor.clone(),
                role: Arc::new(role.clone()),
            },
        ));

        info!(
            tenants = config.tenants.len(),
            is_primary = config.is_primary,
            "Node container initialized"
        );

        Self {
            config,
            bus,
            cache,
            store,
            resolver,
            executor,
            role,
            dispatcher,
        }
    }
}
