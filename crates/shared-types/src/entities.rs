//! # Core Domain Entities
//!
//! Defines the values that travel over the event bus and the function
//! definitions that react to them.
//!
//! ## Clusters
//!
//! - **Events**: `Command`, `MsgType`, `Auth`
//! - **Functions**: `ExecData`

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CLUSTER A: EVENTS
// =============================================================================

/// Unique identifier of a stored function definition.
pub type FunctionId = String;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// The kind of an event published on the bus.
///
/// System kinds are produced by the database layer and the realtime channel
/// fan-out. Anything else is user-defined and counts against the publishing
/// user's rate limit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MsgType {
    /// A document was created.
    DbCreated,
    /// A document was updated.
    DbUpdated,
    /// A document was deleted.
    DbDeleted,
    /// A message was sent out on a realtime channel.
    ChanOut,
    /// A user published a message into a channel.
    ChanIn,
    /// Any other user-defined kind.
    Custom(String),
}

impl MsgType {
    pub const DB_CREATED: &'static str = "db_created";
    pub const DB_UPDATED: &'static str = "db_updated";
    pub const DB_DELETED: &'static str = "db_deleted";
    pub const CHAN_OUT: &'static str = "chan_out";
    pub const CHAN_IN: &'static str = "chan_in";

    /// Wire name of this kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::DbCreated => Self::DB_CREATED,
            Self::DbUpdated => Self::DB_UPDATED,
            Self::DbDeleted => Self::DB_DELETED,
            Self::ChanOut => Self::CHAN_OUT,
            Self::ChanIn => Self::CHAN_IN,
            Self::Custom(name) => name,
        }
    }

    /// Whether the event originates from the system rather than a user.
    ///
    /// System events are trusted and never rate limited.
    #[must_use]
    pub fn is_system(&self) -> bool {
        matches!(
            self,
            Self::DbCreated | Self::DbUpdated | Self::DbDeleted | Self::ChanOut
        )
    }
}

impl From<String> for MsgType {
    fn from(value: String) -> Self {
        match value.as_str() {
            Self::DB_CREATED => Self::DbCreated,
            Self::DB_UPDATED => Self::DbUpdated,
            Self::DB_DELETED => Self::DbDeleted,
            Self::CHAN_OUT => Self::ChanOut,
            Self::CHAN_IN => Self::ChanIn,
            _ => Self::Custom(value),
        }
    }
}

impl From<&str> for MsgType {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<MsgType> for String {
    fn from(value: MsgType) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity resolved from the publisher's credentials.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Auth {
    /// Tenant account the user belongs to.
    pub account_id: String,
    /// The user that caused the event.
    pub user_id: String,
    /// Contact email, when known.
    #[serde(default)]
    pub email: String,
    /// Role level inside the account.
    #[serde(default)]
    pub role: i32,
}

/// A single notification published on the bus.
///
/// Immutable once published; the dispatcher only ever reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Kind of the event.
    #[serde(rename = "type")]
    pub msg_type: MsgType,
    /// Tenant-scoped channel the event belongs to.
    pub channel: String,
    /// Raw credential used to re-derive the tenant context.
    pub token: String,
    /// Resolved identity of the publisher.
    pub auth: Auth,
    /// Opaque document or value carried with the event.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Command {
    /// Create a command with an empty payload.
    pub fn new(
        msg_type: impl Into<MsgType>,
        channel: impl Into<String>,
        token: impl Into<String>,
        auth: Auth,
    ) -> Self {
        Self {
            msg_type: msg_type.into(),
            channel: channel.into(),
            token: token.into(),
            auth,
            data: serde_json::Value::Null,
        }
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// Whether the command bypasses per-user rate limiting.
    #[must_use]
    pub fn is_system_event(&self) -> bool {
        self.msg_type.is_system()
    }
}

// =============================================================================
// CLUSTER B: FUNCTIONS
// =============================================================================

/// Persisted description of a server-side function.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExecData {
    /// Stable identifier.
    pub id: FunctionId,
    /// Owning tenant account.
    #[serde(default)]
    pub account_id: String,
    /// Human-readable name, used in logs.
    pub function_name: String,
    /// Channel this function listens on.
    pub trigger_topic: String,
    /// Executable content handed to the runtime.
    pub code: String,
    /// Revision counter, bumped on each edit.
    #[serde(default)]
    pub version: i32,
    /// When the definition was last changed.
    #[serde(default)]
    pub last_updated: Timestamp,
}

impl ExecData {
    /// Create a definition listening on `trigger_topic`.
    pub fn new(
        id: impl Into<FunctionId>,
        function_name: impl Into<String>,
        trigger_topic: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            function_name: function_name.into(),
            trigger_topic: trigger_topic.into(),
            code: code.into(),
            ..Self::default()
        }
    }
}
