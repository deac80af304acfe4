//! # Event Subscriber
//!
//! Defines the subscription side of the event bus.

use crate::events::{BusMessage, EventFilter};
use shared_types::Command;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

/// Trait for subscribing to topics on the bus.
pub trait EventSubscriber: Send + Sync {
    /// Subscribe to commands published on `topic`.
    fn subscribe(&self, topic: &str) -> Subscription;
}

/// A subscription handle for receiving commands.
///
/// Ends when the bus raises its closed signal or is dropped. When the handle
/// is dropped, the subscription bookkeeping is cleaned up.
pub struct Subscription {
    /// The broadcast receiver.
    receiver: broadcast::Receiver<BusMessage>,

    /// Closed signal raised by the bus.
    closed: watch::Receiver<bool>,

    /// Filter for this subscription.
    filter: EventFilter,

    /// Reference to subscription tracking (for cleanup).
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// Topic key for this subscription.
    topic_key: String,
}

impl Subscription {
    /// Create a new subscription.
    pub fn new(
        receiver: broadcast::Receiver<BusMessage>,
        closed: watch::Receiver<bool>,
        filter: EventFilter,
        subscriptions: Arc<RwLock<HashMap<String, usize>>>,
    ) -> Self {
        let topic_key = filter.key().to_owned();
        Self {
            receiver,
            closed,
            filter,
            subscriptions,
            topic_key,
        }
    }

    /// Receive the next command that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Some(command)` - The next matching command
    /// - `None` - The closed signal fired or the bus was dropped
    pub async fn recv(&mut self) -> Option<Command> {
        loop {
            if self.is_closed() {
                return None;
            }

            tokio::select! {
                biased;
                changed = self.closed.changed() => {
                    if changed.is_err() {
                        return None;
                    }
                    // Re-checked at the top of the loop.
                }
                received = self.receiver.recv() => match received {
                    Ok(message) => {
                        if self.filter.matches(&message) {
                            return Some(message.command);
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        warn!(lagged = count, topic = %self.topic_key, "Subscriber lagged, some events dropped");
                    }
                },
            }
        }
    }

    /// Whether the closed signal has fired.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Ok(mut subs) = self.subscriptions.write() else {
            return;
        };
        let Some(count) = subs.get_mut(&self.topic_key) else {
            debug!(topic = %self.topic_key, "Subscription dropped");
            return;
        };

        *count = count.saturating_sub(1);
        if *count == 0 {
            subs.remove(&self.topic_key);
        }
        debug!(topic = %self.topic_key, "Subscription dropped");
    }
}
