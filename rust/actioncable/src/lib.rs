//! Channel subscriptions for the [ActionCable] publish/subscribe protocol.
//!
//! This crate models a single logical channel subscription layered on top of a duplex
//! connection that is already speaking the ActionCable JSON protocol. It tracks the
//! subscription's state, encodes `subscribe`, `unsubscribe` and `message` frames, buffers
//! outbound messages until the server confirms the subscription, and routes inbound frames to
//! state transitions or an application callback.
//!
//! The transport itself is not part of this crate. Implement [`Connection`] for whatever owns
//! the socket, and forward inbound frames to the matching [`Subscription`].
//!
//! [ActionCable]: https://guides.rubyonrails.org/action_cable_overview.html
//!
//! # Getting started
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use actioncable::{Connection, Identifier, Subscription};
//! use serde_json::json;
//!
//! # fn func(connection: Arc<impl Connection + 'static>) {
//! let identifier = Identifier::channel("ChatChannel").with("room", "1");
//! let subscription = Subscription::builder(identifier)
//!     .on_message(|message| println!("received: {message}"))
//!     .build(&connection);
//!
//! subscription.create();
//!
//! // Queued until the server confirms the subscription.
//! subscription.send(json!({"text": "hi"}));
//! # }
//! ```
//!
//! # Subscription lifecycle
//!
//! A subscription starts out [`Unsubscribed`](SubscriptionState::Unsubscribed). Calling
//! [`Subscription::create`] sends a `subscribe` frame and moves to
//! [`Pending`](SubscriptionState::Pending), or to
//! [`ConnectionPending`](SubscriptionState::ConnectionPending) if the connection is not
//! established yet. The server answers with `confirm_subscription` or `reject_subscription`,
//! which the connection delivers through [`Subscription::received`].
//!
//! Messages sent while the subscription is pending are queued and flushed in order once the
//! subscription is confirmed. Messages sent while unsubscribed or rejected are discarded.
//!
//! # Features
//!
//! - `tungstenite` - Enables conversions between protocol frames and `tokio-tungstenite`
//!   websocket messages.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

use thiserror::Error;

mod connection;
mod outbound;
pub mod protocol;
mod subscription;
#[cfg(test)]
mod testutil;

pub use connection::{Connection, SubscriptionRegistry};
pub use outbound::{JsonPayload, OutboundMessage};
pub use protocol::Identifier;
pub use subscription::{
    MessageCallback, StateCallback, Subscription, SubscriptionBuilder, SubscriptionId,
    SubscriptionState,
};

/// An error type for errors generated by this crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ActionCableError {
    /// An unspecified error.
    ///
    /// [`Connection`] implementations can use this to report transport errors.
    #[error("{0}")]
    Unspecified(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
    /// The channel identifier could not be serialized to JSON.
    #[error("Invalid channel identifier: {0}")]
    InvalidIdentifier(#[source] serde_json::Error),
    /// The connection is not currently established.
    ///
    /// Returned by [`Connection::send`] implementations that cannot accept frames until the
    /// transport is (re)established.
    #[error("Connection not established")]
    NotConnected,
    /// The connection has been closed and cannot accept frames.
    #[error("Connection closed")]
    ConnectionClosed,
}
