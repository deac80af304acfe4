//! Application services: the trigger cache and the dispatcher driving it.

pub mod dispatcher;
pub mod trigger_cache;


pub use dispatcher::{DispatcherPorts, TriggerDispatcher};
pub use trigger_cache::{TriggerCache, FUNCTION_KEY_PREFIX};
