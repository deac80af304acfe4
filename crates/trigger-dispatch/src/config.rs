//! Configuration for the Trigger Dispatcher

use crate::domain::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-user throttling of user-triggered events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Events accepted per user inside one window
    pub max_events: u32,
    /// Window length in seconds, counted from the user's first event
    pub window_secs: u64,
}

impl RateLimitConfig {
    /// Window length as a `Duration`.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_events: 5,
            window_secs: 60,
        }
    }
}

/// Dispatcher configuration
///
/// Missing fields fall back to their defaults when deserialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Topic the dispatcher subscribes to
    pub system_topic: String,
    /// User event throttling
    pub rate_limit: RateLimitConfig,
    /// Prefix of per-function cache keys
    pub function_key_prefix: String,
}

impl DispatchConfig {
    /// Reject configurations the dispatcher cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.system_topic.trim().is_empty() {
            return Err(ConfigError::EmptySystemTopic);
        }
        if self.rate_limit.max_events == 0 {
            return Err(ConfigError::ZeroRateLimit);
        }
        if self.rate_limit.window_secs == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.function_key_prefix.is_empty() {
            return Err(ConfigError::EmptyKeyPrefix);
        }
        Ok(())
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            system_topic: shared_bus::SYSTEM_TOPIC.to_owned(),
            rate_limit: RateLimitConfig::default(),
            function_key_prefix: "fn_".to_owned(),
        }
    }
}
