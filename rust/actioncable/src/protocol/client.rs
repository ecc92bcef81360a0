//! Client commands.

use serde::{Deserialize, Serialize};

use crate::protocol::ParseError;

mod message_data;
mod subscribe;
mod unsubscribe;

pub use message_data::MessageData;
pub use subscribe::Subscribe;
pub use unsubscribe::Unsubscribe;

use super::JsonMessage;

/// A frame sent by the client.
///
/// Serializes as the wrapped command, tagged by its `command` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
#[allow(missing_docs)]
pub enum ClientMessage {
    Subscribe(Subscribe),
    Unsubscribe(Unsubscribe),
    MessageData(MessageData),
}

impl ClientMessage {
    /// Parses a client message from JSON.
    pub fn parse_json(json: &str) -> Result<Self, ParseError> {
        let msg = serde_json::from_str::<JsonCommand>(json)?;
        Ok(msg.into())
    }

    /// Returns the canonical identifier of the channel this frame addresses.
    pub fn identifier(&self) -> &str {
        match self {
            Self::Subscribe(m) => &m.identifier,
            Self::Unsubscribe(m) => &m.identifier,
            Self::MessageData(m) => &m.identifier,
        }
    }

    /// Returns the `command` tag of this frame.
    pub fn command(&self) -> &'static str {
        match self {
            Self::Subscribe(_) => "subscribe",
            Self::Unsubscribe(_) => "unsubscribe",
            Self::MessageData(_) => "message",
        }
    }
}

impl JsonMessage for ClientMessage {}

impl From<Subscribe> for ClientMessage {
    fn from(m: Subscribe) -> Self {
        Self::Subscribe(m)
    }
}

impl From<Unsubscribe> for ClientMessage {
    fn from(m: Unsubscribe) -> Self {
        Self::Unsubscribe(m)
    }
}

impl From<MessageData> for ClientMessage {
    fn from(m: MessageData) -> Self {
        Self::MessageData(m)
    }
}

#[derive(Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
enum JsonCommand {
    Subscribe(Subscribe),
    Unsubscribe(Unsubscribe),
    #[serde(rename = "message")]
    MessageData(MessageData),
}

impl From<JsonCommand> for ClientMessage {
    fn from(m: JsonCommand) -> Self {
        match m {
            JsonCommand::Subscribe(m) => Self::Subscribe(m),
            JsonCommand::Unsubscribe(m) => Self::Unsubscribe(m),
            JsonCommand::MessageData(m) => Self::MessageData(m),
        }
    }
}
