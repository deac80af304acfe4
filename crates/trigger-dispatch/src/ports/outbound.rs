//! Outbound Ports (Driven Ports / SPI)
//!
//! The external collaborators the dispatcher depends on. Implementations
//! live in `adapters/` or in the embedding application.

use crate::domain::entities::{ExecutionEnvironment, TenantContext};
use crate::domain::errors::{ContextError, ExecutionError};
use async_trait::async_trait;
use shared_types::{Command, ExecData, StoreError};

/// Durable store of function definitions.
#[async_trait]
pub trait FunctionStore: Send + Sync {
    /// List every function of tenant `base_name` listening on `channel`.
    async fn list_functions_by_trigger(
        &self,
        base_name: &str,
        channel: &str,
    ) -> Result<Vec<ExecData>, StoreError>;
}

/// Maps a command's raw token to its tenant context.
#[async_trait]
pub trait ContextResolver: Send + Sync {
    /// Resolve the tenant for `command`.
    ///
    /// Called once per event; the result is never cached.
    async fn resolve(&self, command: &Command) -> Result<TenantContext, ContextError>;
}

/// Sandboxed runtime executing function code.
#[async_trait]
pub trait FunctionExecutor: Send + Sync {
    /// Run `env.function` against the triggering `command`.
    async fn execute(
        &self,
        env: &ExecutionEnvironment,
        command: &Command,
    ) -> Result<(), ExecutionError>;
}

/// Whether this process is the designated primary instance.
///
/// Consulted on every received event, so the answer may change at runtime
/// (e.g. when a leader-election collaborator flips it).
pub trait InstanceRole: Send + Sync {
    fn is_primary(&self) -> bool;
}
