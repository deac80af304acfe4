//! Ports module for Trigger Dispatch
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::TriggerDispatchApi;
pub use outbound::{ContextResolver, FunctionExecutor, FunctionStore, InstanceRole};
