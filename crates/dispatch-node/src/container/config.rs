//! # Node Configuration
//!
//! Defaults overridden by `DISPATCH_*` environment variables.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `DISPATCH_SYSTEM_TOPIC` | `dispatch.system_topic` |
//! | `DISPATCH_RATE_LIMIT_MAX` | `dispatch.rate_limit.max_events` |
//! | `DISPATCH_RATE_LIMIT_WINDOW_SECS` | `dispatch.rate_limit.window_secs` |
//! | `DISPATCH_IS_PRIMARY` | `is_primary` |
//! | `DISPATCH_TENANTS` | `tenants`, as `token=base,token=base` |
//!
//! Unparseable values are logged and the default is kept.

use thiserror::Error;
use tracing::{info, warn};
use trigger_dispatch::DispatchConfig;

pub const ENV_SYSTEM_TOPIC: &str = "DISPATCH_SYSTEM_TOPIC";
pub const ENV_RATE_LIMIT_MAX: &str = "DISPATCH_RATE_LIMIT_MAX";
pub const ENV_RATE_LIMIT_WINDOW_SECS: &str = "DISPATCH_RATE_LIMIT_WINDOW_SECS";
pub const ENV_IS_PRIMARY: &str = "DISPATCH_IS_PRIMARY";
pub const ENV_TENANTS: &str = "DISPATCH_TENANTS";

/// A token accepted by the node and the tenant database it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantBinding {
    pub token: String,
    pub base_name: String,
}

/// Complete node configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// Dispatcher settings.
    pub dispatch: DispatchConfig,
    /// Whether this node starts as the primary instance.
    pub is_primary: bool,
    /// Tokens resolvable without an external auth service.
    pub tenants: Vec<TenantBinding>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            dispatch: DispatchConfig::default(),
            // A lone node is its own primary.
            is_primary: true,
            tenants: Vec::new(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum NodeConfigError {
    #[error("Invalid dispatcher configuration: {0}")]
    Dispatch(#[from] trigger_dispatch::ConfigError),
}

impl NodeConfig {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup, starting from defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(topic) = lookup(ENV_SYSTEM_TOPIC) {
            config.dispatch.system_topic = topic;
        }

        if let Some(raw) = lookup(ENV_RATE_LIMIT_MAX) {
            match raw.trim().parse() {
                Ok(max) => config.dispatch.rate_limit.max_events = max,
                Err(_) => warn!(value = %raw, "{ENV_RATE_LIMIT_MAX} is not a number, keeping default"),
            }
        }

        if let Some(raw) = lookup(ENV_RATE_LIMIT_WINDOW_SECS) {
            match raw.trim().parse() {
                Ok(secs) => config.dispatch.rate_limit.window_secs = secs,
                Err(_) => {
                    warn!(value = %raw, "{ENV_RATE_LIMIT_WINDOW_SECS} is not a number, keeping default")
                }
            }
        }

        if let Some(raw) = lookup(ENV_IS_PRIMARY) {
            match parse_bool(&raw) {
                Some(flag) => config.is_primary = flag,
                None => warn!(value = %raw, "{ENV_IS_PRIMARY} is not a boolean, keeping default"),
            }
        }

        if let Some(raw) = lookup(ENV_TENANTS) {
            config.tenants = parse_tenants(&raw);
            info!(count = config.tenants.len(), "Loaded tenant tokens from environment");
        }

        config
    }

    /// Reject configurations the node cannot run with.
    pub fn validate(&self) -> Result<(), NodeConfigError> {
        self.dispatch.validate()?;
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_tenants(raw: &str) -> Vec<TenantBinding> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| match pair.split_once('=') {
            Some((token, base)) if !token.trim().is_empty() && !base.trim().is_empty() => {
                Some(TenantBinding {
                    token: token.trim().to_owned(),
                    base_name: base.trim().to_owned(),
                })
            }
            _ => {
                warn!(entry = %pair, "Ignoring malformed {ENV_TENANTS} entry");
                None
            }
        })
        .collect()
}
