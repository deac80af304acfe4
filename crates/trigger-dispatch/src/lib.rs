//! # Trigger Dispatch
//!
//! Routes events published on the system topic to the server-side functions
//! registered on their channel.
//!
//! ## Purpose
//!
//! Every database change and every message pushed into a realtime channel is
//! published on the bus. The dispatcher picks them up, finds the functions
//! listening on the event's channel and runs each of them concurrently.
//! Only the primary instance dispatches, so replicas sharing one bus never
//! run a function twice.
//!
//! ## Pipeline
//!
//! ```text
//! bus ("sbsys") ──recv──→ receive() ──not primary──→ (dropped, no log)
//!                            │
//!                            └── spawn ──→ classify
//!                                             │
//!                     user event ──→ rate limiter ──over limit──→ (warn, dropped)
//!                                             │
//!                    system event ────────────┤
//!                                             ↓
//!                                  resolve tenant from token
//!                                             ↓
//!                                  TriggerCache.resolve(base, channel)
//!                                             ↓
//!                               spawn one execution per function
//! ```
//!
//! ## Event Classes
//!
//! | Kind | Rate limited |
//! |------|--------------|
//! | `db_created`, `db_updated`, `db_deleted` | No |
//! | `chan_out` | No |
//! | `chan_in` and custom kinds | Yes, 5 per user per 60 s |
//!
//! ## Failure Isolation
//!
//! | Failure | Scope |
//! |---------|-------|
//! | Token does not resolve | One event |
//! | Store fails on cache miss | One event |
//! | Cache write fails | Logged only |
//! | Function errors or panics | One function |
//!
//! Only the closing of the bus subscription stops intake.
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  adapters/ - in-memory store, static resolver, primary flag,   │
//! │              logging executor                                   │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - TriggerDispatchApi                         │
//! │  ports/outbound.rs - FunctionStore, ContextResolver,            │
//! │                      FunctionExecutor, InstanceRole             │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  service/   - TriggerDispatcher, TriggerCache                   │
//! │  domain/    - UserRateLimiter, execution entities, errors       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryFunctionStore, LoggingExecutor, PrimaryFlag, StaticContextResolver};
pub use config::{DispatchConfig, RateLimitConfig};
pub use domain::entities::{
    DispatchOutcome, ExecutionEnvironment, ExecutionReport, ScheduledExecution, TenantContext,
};
pub use domain::errors::{ConfigError, ContextError, DispatchError, ExecutionError};
pub use domain::rate_limiter::UserRateLimiter;
pub use metrics::{DispatchMetrics, DispatchMetricsSnapshot};
pub use ports::inbound::TriggerDispatchApi;
pub use ports::outbound::{ContextResolver, FunctionExecutor, FunctionStore, InstanceRole};
pub use service::{DispatcherPorts, TriggerCache, TriggerDispatcher};
