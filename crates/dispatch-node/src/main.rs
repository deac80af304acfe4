//! # Trigger Dispatch Node
//!
//! Runs one dispatcher against the in-process bus.
//!
//! ## Startup Sequence
//!
//! 1. Install logging (`RUST_LOG`, default `info`)
//! 2. Load configuration from `DISPATCH_*` variables
//! 3. Wire the container and start the dispatcher loop
//! 4. Wait for Ctrl+C, then close the bus

use anyhow::{Context, Result};
use dispatch_node::{DispatchNode, NodeConfig};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = NodeConfig::from_env();
    let node = DispatchNode::new(config).context("Invalid node configuration")?;
    node.start().await;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    node.shutdown().await;

    Ok(())
}
