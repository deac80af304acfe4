//! # Event Publisher
//!
//! Defines the publishing side of the event bus.

use crate::events::{BusMessage, EventFilter};
use crate::subscriber::{EventSubscriber, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use shared_types::Command;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

/// Trait for publishing commands to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a command on a topic.
    ///
    /// # Returns
    ///
    /// The number of active subscribers that received the message.
    async fn publish(&self, topic: &str, command: Command) -> usize;
}

/// In-memory implementation of the event bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer semantics.
/// Suitable for single-node operation; multi-instance deployments plug in a
/// shared bus (e.g. Redis) behind the same traits.
pub struct InMemoryEventBus {
    /// Broadcast sender for messages.
    sender: broadcast::Sender<BusMessage>,

    /// Closed signal shared with every subscription.
    closed: watch::Sender<bool>,

    /// Active subscription count by topic.
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,
}

impl InMemoryEventBus {
    /// Create a new in-memory event bus buffering
    /// `DEFAULT_CHANNEL_CAPACITY` messages per subscriber.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        let (closed, _) = watch::channel(false);
        Self {
            sender,
            closed,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Raise the closed signal. Every open subscription ends.
    pub fn close(&self) {
        self.closed.send_replace(true);
        info!("Event bus closed");
    }

    /// Whether `close` has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Get the number of active subscriptions for a single topic.
    #[must_use]
    pub fn topic_subscriber_count(&self, topic: &str) -> usize {
        self.subscriptions
            .read()
            .ok()
            .and_then(|subs| subs.get(topic).copied())
            .unwrap_or(0)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, topic: &str) -> Subscription {
        let filter = EventFilter::topic(topic);
        let receiver = self.sender.subscribe();

        if let Ok(mut subs) = self.subscriptions.write() {
            *subs.entry(filter.key().to_owned()).or_insert(0) += 1;
        }

        debug!(topic = topic, "New subscription created");

        Subscription::new(
            receiver,
            self.closed.subscribe(),
            filter,
            self.subscriptions.clone(),
        )
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, topic: &str, command: Command) -> usize {
        let msg_type = command.msg_type.clone();
        match self.sender.send(BusMessage::new(topic, command)) {
            Ok(receiver_count) => {
                debug!(
                    topic = topic,
                    msg_type = %msg_type,
                    receivers = receiver_count,
                    "Event published"
                );
                receiver_count
            }
            Err(e) => {
                warn!(
                    topic = topic,
                    msg_type = %msg_type,
                    error = %e,
                    "Event dropped (no receivers)"
                );
                0
            }
        }
    }
}
