//! Message command.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::JsonMessage;

/// Sends an application message on a subscribed channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename = "message")]
pub struct MessageData {
    /// Canonical JSON text of the channel identifier.
    pub identifier: String,
    /// Application payload.
    pub data: Value,
}

impl MessageData {
    /// Creates a new message command.
    pub fn new(identifier: impl Into<String>, data: Value) -> Self {
        Self {
            identifier: identifier.into(),
            data,
        }
    }
}

impl JsonMessage for MessageData {}
