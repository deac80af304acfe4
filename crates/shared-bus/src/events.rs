//! # Bus Messages
//!
//! Defines the unit that flows through the shared bus: a `Command` tagged
//! with the topic it was published on.

use shared_types::Command;

/// A command together with the topic it was published on.
#[derive(Debug, Clone)]
pub struct BusMessage {
    /// Topic the command was published to.
    pub topic: String,
    /// The published command.
    pub command: Command,
}

impl BusMessage {
    /// Wrap a command for publication on `topic`.
    pub fn new(topic: impl Into<String>, command: Command) -> Self {
        Self {
            topic: topic.into(),
            command,
        }
    }
}

/// Topic filter applied by a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    topic: String,
}

impl EventFilter {
    /// Create a filter for a single topic.
    #[must_use]
    pub fn topic(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
        }
    }

    /// Check if a message matches this filter.
    #[must_use]
    pub fn matches(&self, message: &BusMessage) -> bool {
        self.topic == message.topic
    }

    /// Topic used for subscription bookkeeping.
    pub(crate) fn key(&self) -> &str {
        &self.topic
    }
}
