//! # Shared Bus - Event Bus Client
//!
//! The capability the trigger dispatcher consumes: topic-based publish and
//! subscribe for `Command`s, plus a shared key/value cache.
//!
//! ## Publish / Subscribe
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │  CRUD layer  │                    │  Dispatcher  │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe("sbsys")
//! ```
//!
//! ## Closed Signal
//!
//! Every `Subscription` observes the bus's closed signal. Once raised,
//! `recv()` returns `None` and the subscriber is expected to stop.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod cache;
pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use cache::{CacheStore, InMemoryCache, TypedCache};
pub use events::{BusMessage, EventFilter};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventSubscriber, Subscription};

/// Maximum messages to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Reserved topic carrying system events to the function dispatcher.
pub const SYSTEM_TOPIC: &str = "sbsys";
