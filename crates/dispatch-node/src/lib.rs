//! # Dispatch Node Library
//!
//! Exposes the node's wiring for testing. The entry point is the `main.rs`
//! binary.
//!
//! ## Lifecycle
//!
//! ```text
//! NodeConfig::from_env() ──→ DispatchNode::new() ──→ start()
//!                                                       │
//!                                         dispatcher loop on "sbsys"
//!                                                       │
//!                         shutdown() ──→ bus.close() ───┘ (loop returns)
//! ```

pub mod container;

pub use container::{NodeConfig, NodeConfigError, NodeContainer, TenantBinding};

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// How long `shutdown` waits for the dispatcher loop to return.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// A running dispatch node.
pub struct DispatchNode {
    container: Arc<NodeContainer>,
    dispatcher_task: Mutex<Option<JoinHandle<()>>>,
}

impl DispatchNode {
    /// Validate the configuration and wire the node.
    pub fn new(config: NodeConfig) -> Result<Self, NodeConfigError> {
        config.validate()?;
        Ok(Self {
            container: Arc::new(NodeContainer::new(config)),
            dispatcher_task: Mutex::new(None),
        })
    }

    /// Start the dispatcher loop. Calling it twice has no effect.
    pub async fn start(&self) {
        let mut task = self.dispatcher_task.lock().await;
        if task.is_some() {
            return;
        }

        info!("===========================================");
        info!("  Trigger Dispatch Node v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");
        info!(
            topic = %self.container.config.dispatch.system_topic,
            max_events = self.container.config.dispatch.rate_limit.max_events,
            window_secs = self.container.config.dispatch.rate_limit.window_secs,
            is_primary = self.container.config.is_primary,
            "Starting dispatcher"
        );

        let dispatcher = Arc::clone(&self.container.dispatcher);
        *task = Some(tokio::spawn(dispatcher.start()));
    }

    /// Close the bus and wait for the dispatcher loop to return.
    ///
    /// In-flight function executions are not cancelled.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        self.container.bus.close();

        let task = self.dispatcher_task.lock().await.take();
        if let Some(task) = task {
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = %e, "Dispatcher task failed"),
                Err(_) => warn!("Dispatcher did not stop in time"),
            }
        }

        let metrics = self.container.dispatcher.metrics();
        info!(
            events = metrics.events_received,
            rate_limited = metrics.rate_limited,
            executions = metrics.executions_scheduled,
            failed = metrics.executions_failed,
            "Shutdown complete"
        );
    }

    /// Get a reference to the node container.
    pub fn container(&self) -> Arc<NodeContainer> {
        Arc::clone(&self.container)
    }
}
