//! Unsubscribe command.

use serde::{Deserialize, Serialize};

use crate::protocol::JsonMessage;

/// Unsubscribes from a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename = "unsubscribe")]
pub struct Unsubscribe {
    /// Canonical JSON text of the channel identifier.
    pub identifier: String,
}

impl Unsubscribe {
    /// Creates a new unsubscribe command.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }
}

impl JsonMessage for Unsubscribe {}
