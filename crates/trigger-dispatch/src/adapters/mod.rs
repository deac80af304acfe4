//! # Adapters Layer (Hexagonal Architecture)
//!
//! In-process implementations of the outbound ports, used by the node
//! binary and by integration tests.

mod executor;
mod memory_store;
mod primary_flag;
mod resolver;

pub use executor::LoggingExecutor;
pub use memory_store::InMemoryFunctionStore;
pub use primary_flag::PrimaryFlag;
pub use resolver::StaticContextResolver;
