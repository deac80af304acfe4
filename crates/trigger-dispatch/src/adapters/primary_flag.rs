//! Runtime-switchable primary-instance flag.

use crate::ports::outbound::InstanceRole;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Shared boolean telling whether this instance dispatches events.
///
/// Clones share the same flag, so the handle given to a leader-election
/// collaborator flips what the dispatcher sees.
#[derive(Debug, Clone, Default)]
pub struct PrimaryFlag {
    flag: Arc<AtomicBool>,
}

impl PrimaryFlag {
    pub fn new(is_primary: bool) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(is_primary)),
        }
    }

    /// Change the role. Takes effect for the next received event.
    pub fn set_primary(&self, is_primary: bool) {
        let previous = self.flag.swap(is_primary, Ordering::SeqCst);
        if previous != is_primary {
            info!(is_primary, "Instance role changed");
        }
    }
}

impl InstanceRole for PrimaryFlag {
    fn is_primary(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
