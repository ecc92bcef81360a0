//! Tungstenite support.

use tokio_tungstenite::tungstenite::Message;

use crate::protocol::client::{self, ClientMessage};
use crate::protocol::server::ServerMessage;
use crate::protocol::{JsonMessage, ParseError};

impl TryFrom<&Message> for ClientMessage {
    type Error = ParseError;

    fn try_from(msg: &Message) -> Result<Self, Self::Error> {
        match msg {
            Message::Text(utf8) => Self::parse_json(utf8),
            _ => Err(ParseError::UnhandledMessageType),
        }
    }
}

impl TryFrom<&Message> for ServerMessage {
    type Error = ParseError;

    fn try_from(msg: &Message) -> Result<Self, Self::Error> {
        match msg {
            Message::Text(utf8) => Self::parse_json(utf8),
            _ => Err(ParseError::UnhandledMessageType),
        }
    }
}

impl From<&ClientMessage> for Message {
    fn from(value: &ClientMessage) -> Self {
        Message::Text(value.to_string().into())
    }
}

impl From<&client::Subscribe> for Message {
    fn from(value: &client::Subscribe) -> Self {
        Message::Text(value.to_string().into())
    }
}

impl From<&client::Unsubscribe> for Message {
    fn from(value: &client::Unsubscribe) -> Self {
        Message::Text(value.to_string().into())
    }
}

impl From<&client::MessageData> for Message {
    fn from(value: &client::MessageData) -> Self {
        Message::Text(value.to_string().into())
    }
}
