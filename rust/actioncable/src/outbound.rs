use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

/// An application message that can be sent on a subscription.
///
/// The subscription never inspects the message. It calls [`to_wire_format`] when the message is
/// actually sent, which for queued messages is when the subscription is confirmed, and places the
/// result in the `data` field of the frame.
///
/// [`to_wire_format`]: OutboundMessage::to_wire_format
pub trait OutboundMessage: Send {
    /// Returns the JSON payload for this message.
    ///
    /// This must not call back into the subscription that is sending it.
    fn to_wire_format(&self) -> Value;
}

impl OutboundMessage for Value {
    fn to_wire_format(&self) -> Value {
        self.clone()
    }
}

impl OutboundMessage for Map<String, Value> {
    fn to_wire_format(&self) -> Value {
        Value::Object(self.clone())
    }
}

impl<M: OutboundMessage + ?Sized> OutboundMessage for Box<M> {
    fn to_wire_format(&self) -> Value {
        (**self).to_wire_format()
    }
}

/// Adapts any serializable type into an [`OutboundMessage`].
///
/// A value that fails to serialize is sent as `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPayload<T>(pub T);

impl<T: Serialize + Send> OutboundMessage for JsonPayload<T> {
    fn to_wire_format(&self) -> Value {
        serde_json::to_value(&self.0).unwrap_or_else(|err| {
            warn!("failed to encode {} payload: {err}", std::any::type_name::<T>());
            Value::Null
        })
    }
}
