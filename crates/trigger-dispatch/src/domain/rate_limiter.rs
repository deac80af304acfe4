//! # User Rate Limiter
//!
//! Fixed-window counter per user for user-triggered events.
//!
//! ## Algorithm
//!
//! - The first event from a user opens a window with a count of 1 and
//!   schedules the window's removal `window` later.
//! - Every further event increments the count; it is accepted while the
//!   post-increment count is `<= max_events`.
//! - Rejected events still count. They are dropped, never queued.
//!
//! The window is not sliding: activity inside it does not extend it.

use crate::config::RateLimitConfig;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Counter for one user's current window.
#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    /// Identifies the window so a late expiry never removes a newer one.
    window_id: u64,
    /// Events seen in this window, accepted or not.
    count: u32,
    /// When the window was opened.
    opened_at: Instant,
}

impl WindowCounter {
    fn open(window_id: u64, now: Instant) -> Self {
        Self {
            window_id,
            count: 0,
            opened_at: now,
        }
    }
}

/// Per-user fixed-window rate limiter.
///
/// Safe to share between concurrently running event handlers: the
/// increment and the threshold read happen under the same map-shard lock.
pub struct UserRateLimiter {
    /// Events accepted per window.
    max_events: u32,
    /// Window length.
    window: Duration,
    /// Live windows by user id.
    counters: Arc<DashMap<String, WindowCounter>>,
    /// Source of window ids.
    next_window_id: AtomicU64,
}

impl UserRateLimiter {
    /// Create a limiter.
    ///
    /// # Parameters
    ///
    /// - `max_events`: events accepted per user per window
    /// - `window`: window length, measured from the user's first event
    pub fn new(max_events: u32, window: Duration) -> Self {
        Self {
            max_events,
            window,
            counters: Arc::new(DashMap::new()),
            next_window_id: AtomicU64::new(1),
        }
    }

    /// Create a limiter from configuration.
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_events, config.window())
    }

    /// Record an event for `user_id` and report whether it may proceed.
    pub fn allow(&self, user_id: &str) -> bool {
        let now = Instant::now();
        let mut opened = None;

        let count = {
            let mut entry = self.counters.entry(user_id.to_owned()).or_insert_with(|| {
                let id = self.next_window_id();
                opened = Some(id);
                WindowCounter::open(id, now)
            });

            // Expiry task not run yet, or no runtime to run it.
            if opened.is_none() && now.duration_since(entry.opened_at) >= self.window {
                let id = self.next_window_id();
                opened = Some(id);
                *entry = WindowCounter::open(id, now);
            }

            entry.count = entry.count.saturating_add(1);
            entry.count
        };

        if let Some(window_id) = opened {
            self.schedule_expiry(user_id.to_owned(), window_id);
        }

        count <= self.max_events
    }

    /// Events recorded for `user_id` in the current window.
    pub fn count(&self, user_id: &str) -> Option<u32> {
        self.counters.get(user_id).map(|c| c.count)
    }

    /// Number of users with an open window.
    pub fn tracked_users(&self) -> usize {
        self.counters.len()
    }

    /// Events accepted per window.
    pub fn max_events(&self) -> u32 {
        self.max_events
    }

    /// Window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    fn next_window_id(&self) -> u64 {
        self.next_window_id.fetch_add(1, Ordering::Relaxed)
    }

    fn schedule_expiry(&self, user_id: String, window_id: u64) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!(user_id = %user_id, "No runtime for window expiry, window resets lazily");
            return;
        };

        let counters = Arc::clone(&self.counters);
        let window = self.window;
        runtime.spawn(async move {
            tokio::time::sleep(window).await;
            expire_window(&counters, &user_id, window_id);
        });
    }
}

/// Remove the window of `user_id` if it is still the one numbered `window_id`.
fn expire_window(
    counters: &DashMap<String, WindowCounter>,
    user_id: &str,
    window_id: u64,
) -> bool {
    let expired = counters
        .remove_if(user_id, |_, c| c.window_id == window_id)
        .is_some();
    if expired {
        debug!(user_id = %user_id, "Rate limit window expired");
    }
    expired
}

impl Default for UserRateLimiter {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}
