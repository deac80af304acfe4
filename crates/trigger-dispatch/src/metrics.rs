//! Counters for dispatcher activity
//!
//! Lock-free counters updated on the hot path; read them through
//! [`DispatchMetrics::snapshot`].

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for the dispatcher
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Events handed to dispatch on a primary instance
    pub events_received: AtomicU64,
    /// Events ignored because this instance is not primary
    pub dropped_non_primary: AtomicU64,
    /// User events dropped by the rate limiter
    pub rate_limited: AtomicU64,
    /// Events whose token did not resolve to a tenant
    pub context_failures: AtomicU64,
    /// Events whose triggers could not be resolved
    pub resolution_failures: AtomicU64,
    /// Function executions spawned
    pub executions_scheduled: AtomicU64,
    /// Function executions that reported success
    pub executions_succeeded: AtomicU64,
    /// Function executions that reported an error
    pub executions_failed: AtomicU64,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped_non_primary(&self) {
        self.dropped_non_primary.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_context_failure(&self) {
        self.context_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_resolution_failure(&self) {
        self.resolution_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_execution_scheduled(&self) {
        self.executions_scheduled.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the end of one execution
    pub fn record_execution_finished(&self, success: bool) {
        if success {
            self.executions_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.executions_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Executions spawned but not yet finished
    pub fn executions_in_flight(&self) -> u64 {
        let scheduled = self.executions_scheduled.load(Ordering::Relaxed);
        let finished = self.executions_succeeded.load(Ordering::Relaxed)
            + self.executions_failed.load(Ordering::Relaxed);
        scheduled.saturating_sub(finished)
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> DispatchMetricsSnapshot {
        DispatchMetricsSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            dropped_non_primary: self.dropped_non_primary.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            context_failures: self.context_failures.load(Ordering::Relaxed),
            resolution_failures: self.resolution_failures.load(Ordering::Relaxed),
            executions_scheduled: self.executions_scheduled.load(Ordering::Relaxed),
            executions_succeeded: self.executions_succeeded.load(Ordering::Relaxed),
            executions_failed: self.executions_failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchMetricsSnapshot {
    pub events_received: u64,
    pub dropped_non_primary: u64,
    pub rate_limited: u64,
    pub context_failures: u64,
    pub resolution_failures: u64,
    pub executions_scheduled: u64,
    pub executions_succeeded: u64,
    pub executions_failed: u64,
}
