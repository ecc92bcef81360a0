//! Subscribe command.

use serde::{Deserialize, Serialize};

use crate::protocol::JsonMessage;

/// Subscribes to a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename = "subscribe")]
pub struct Subscribe {
    /// Canonical JSON text of the channel identifier.
    pub identifier: String,
}

impl Subscribe {
    /// Creates a new subscribe command.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }
}

impl JsonMessage for Subscribe {}
