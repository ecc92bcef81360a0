//! ActionCable wire frames.
//!
//! Frames sent by the client are in [`client`]; frames received from the server are in
//! [`server`]. Every frame is a JSON object.

pub mod client;
mod identifier;
mod message;
mod parse_error;
pub mod server;
#[cfg(feature = "tungstenite")]
pub mod tungstenite;

pub use identifier::Identifier;
pub use message::JsonMessage;
pub use parse_error::ParseError;
