//! # Trigger Dispatch Test Suite
//!
//! Cross-crate scenarios driving the dispatcher through the event bus.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs        # Recording executor, wiring helpers
//!     ├── pipeline.rs        # Bus → dispatcher → executions
//!     └── multi_instance.rs  # Replicas sharing one bus and cache
//!
//! tests/benches/
//! └── dispatch_benchmarks.rs # Rate limiter and trigger cache hot paths
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p dispatch-tests
//! cargo bench -p dispatch-tests
//! ```

pub mod integration;
