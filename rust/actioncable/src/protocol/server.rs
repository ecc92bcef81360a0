//! Server frames.

use serde_json::Value;

use crate::protocol::ParseError;

/// The `type` of a server frame confirming a subscription.
pub const CONFIRM_SUBSCRIPTION: &str = "confirm_subscription";

/// The `type` of a server frame rejecting a subscription.
pub const REJECT_SUBSCRIPTION: &str = "reject_subscription";

/// A frame received from the server, as seen by a subscription.
///
/// Only the subscription lifecycle types are recognized. Everything else is kept as
/// [`ServerMessage::Other`], along with its `message` payload if it has one.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// The server accepted the subscription.
    ConfirmSubscription,
    /// The server refused the subscription.
    RejectSubscription,
    /// Any other frame.
    Other {
        /// The frame's `type` field, if present.
        kind: Option<String>,
        /// The frame's `message` field, if present.
        message: Option<Value>,
    },
}

impl ServerMessage {
    /// Parses a server message from JSON.
    pub fn parse_json(json: &str) -> Result<Self, ParseError> {
        let value = serde_json::from_str::<Value>(json)?;
        Ok(Self::from_value(value))
    }

    /// Classifies a decoded frame.
    ///
    /// This never fails. Frames that are not JSON objects have neither a type nor a message.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return Self::Other {
                kind: None,
                message: None,
            };
        };
        let kind = map.remove("type").map(|kind| match kind {
            Value::String(kind) => kind,
            other => other.to_string(),
        });
        match kind.as_deref() {
            Some(CONFIRM_SUBSCRIPTION) => Self::ConfirmSubscription,
            Some(REJECT_SUBSCRIPTION) => Self::RejectSubscription,
            _ => Self::Other {
                kind,
                message: map.remove("message"),
            },
        }
    }
}

impl From<Value> for ServerMessage {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}
