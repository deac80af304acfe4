//! Inbound Ports (Driving Ports / API)

use crate::domain::entities::DispatchOutcome;
use crate::domain::errors::DispatchError;
use async_trait::async_trait;
use shared_types::{Command, FunctionId};

/// Primary Trigger Dispatch API
#[async_trait]
pub trait TriggerDispatchApi: Send + Sync {
    /// Process one command: rate-limit user events, resolve the functions
    /// listening on its channel and spawn one execution per function.
    ///
    /// Returns once executions are spawned, not when they finish.
    async fn dispatch(&self, command: Command) -> Result<DispatchOutcome, DispatchError>;

    /// Drop the cached trigger index of `channel` in tenant `base_name`.
    ///
    /// Called by the layer that creates, edits or deletes functions so
    /// the next event reloads from the durable store.
    async fn invalidate_trigger(&self, base_name: &str, channel: &str)
        -> Result<bool, DispatchError>;

    /// Drop the cached definition of one function.
    async fn invalidate_function(&self, function_id: &FunctionId) -> Result<bool, DispatchError>;

    /// Whether this instance currently dispatches events.
    fn is_primary(&self) -> bool;
}
