//! Channel subscriptions.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex, RwLock};
use serde_json::Value;
use tracing::{debug, info, warn, Span};

mod builder;
mod state;

pub use builder::SubscriptionBuilder;
pub use state::{SubscriptionId, SubscriptionState};

use crate::protocol::client::{ClientMessage, MessageData, Subscribe, Unsubscribe};
use crate::protocol::server::ServerMessage;
use crate::protocol::ParseError;
use crate::{Connection, Identifier, OutboundMessage};

/// Callback invoked with the payload of an inbound application message.
pub type MessageCallback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Callback invoked with the new state, and optional data, on every state transition.
pub type StateCallback = Arc<dyn Fn(SubscriptionState, Option<&Value>) + Send + Sync>;

#[derive(Default)]
struct Inner {
    state: SubscriptionState,
    queue: VecDeque<Box<dyn OutboundMessage>>,
    /// State events not yet delivered to the state callback, in transition order.
    events: VecDeque<SubscriptionState>,
}

/// A subscription to a single channel on a [`Connection`].
///
/// All operations take `&self`, and a subscription may be shared between threads. The state and
/// the outbound queue are guarded by a single lock. Frames are handed to the connection while
/// that lock is held, so the frames of one subscription are sent in a well-defined order.
/// Callbacks are invoked after the lock is released, and may call back into the subscription.
/// State events are recorded under the lock and delivered one at a time, so observers see
/// them in transition order.
///
/// No operation fails. Discarded messages, unrecognized frames, and connection errors are
/// reported with [`tracing`] events, in the subscription's span.
pub struct Subscription {
    id: SubscriptionId,
    identifier: Identifier,
    identifier_string: String,
    connection: Weak<dyn Connection>,
    inner: Mutex<Inner>,
    notify: ReentrantMutex<()>,
    on_message: RwLock<Option<MessageCallback>>,
    on_state_event: Option<StateCallback>,
    span: Span,
}

impl Subscription {
    /// Creates a subscription with no callbacks, and registers it with the connection.
    ///
    /// Use [`Subscription::builder`] to configure callbacks.
    pub fn new<C: Connection + 'static>(connection: &Arc<C>, identifier: Identifier) -> Arc<Self> {
        SubscriptionBuilder::new(identifier).build(connection)
    }

    /// Returns a builder for a subscription to the identified channel.
    pub fn builder(identifier: Identifier) -> SubscriptionBuilder {
        SubscriptionBuilder::new(identifier)
    }

    /// Returns the subscription's unique ID.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns the channel identifier.
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Returns the canonical JSON text of the channel identifier, as sent on the wire.
    pub fn identifier_string(&self) -> &str {
        &self.identifier_string
    }

    /// Returns the current state.
    pub fn state(&self) -> SubscriptionState {
        self.inner.lock().state
    }

    /// Returns the number of messages waiting for the subscription to be confirmed.
    pub fn queue_len(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Sets the callback invoked with the payload of inbound application messages.
    ///
    /// Replaces any callback set previously.
    pub fn on_receive(&self, callback: impl Fn(&Value) + Send + Sync + 'static) {
        let _guard = self.span.enter();
        debug!("on receive callback set");
        *self.on_message.write() = Some(Arc::new(callback));
    }

    /// Subscribes to the channel on the server.
    ///
    /// If the connection is established, sends a subscribe command and moves to
    /// [`Pending`](SubscriptionState::Pending). Otherwise moves to
    /// [`ConnectionPending`](SubscriptionState::ConnectionPending) without contacting the
    /// server; call `create` again (or [`SubscriptionRegistry::resume_pending`]) once the
    /// connection is established.
    ///
    /// [`SubscriptionRegistry::resume_pending`]: crate::SubscriptionRegistry::resume_pending
    pub fn create(&self) {
        let _guard = self.span.enter();
        debug!("create subscription on server");
        {
            let mut inner = self.inner.lock();
            match self.connection() {
                Some(connection) if connection.is_connected() => {
                    self.dispatch(&*connection, Subscribe::new(&self.identifier_string).into());
                    self.set_state(&mut inner, SubscriptionState::Pending);
                }
                _ => {
                    debug!("connection not established; subscription pending");
                    self.set_state(&mut inner, SubscriptionState::ConnectionPending);
                }
            }
        }
        self.notify_state();
    }

    /// Unsubscribes from the channel on the server.
    ///
    /// Always sends an unsubscribe command, regardless of the current state or whether the
    /// connection is established, and moves to [`Unsubscribed`](SubscriptionState::Unsubscribed).
    /// The subscription remains registered with the connection.
    pub fn remove(&self) {
        let _guard = self.span.enter();
        debug!("remove subscription from server");
        {
            let mut inner = self.inner.lock();
            if let Some(connection) = self.connection() {
                self.dispatch(&*connection, Unsubscribe::new(&self.identifier_string).into());
            }
            self.set_state(&mut inner, SubscriptionState::Unsubscribed);
        }
        self.notify_state();
    }

    /// Sends a message on the channel.
    ///
    /// What happens depends on the current state:
    ///
    /// - [`Subscribed`](SubscriptionState::Subscribed): the message is sent immediately.
    /// - [`Pending`](SubscriptionState::Pending) or
    ///   [`ConnectionPending`](SubscriptionState::ConnectionPending): the message is queued,
    ///   and sent when the subscription is confirmed.
    /// - [`Unsubscribed`](SubscriptionState::Unsubscribed) or
    ///   [`Rejected`](SubscriptionState::Rejected): the message is discarded.
    pub fn send(&self, message: impl OutboundMessage + 'static) {
        let _guard = self.span.enter();
        let mut inner = self.inner.lock();
        match inner.state {
            SubscriptionState::Pending | SubscriptionState::ConnectionPending => {
                info!("subscription not confirmed; adding message to queue");
                inner.queue.push_back(Box::new(message));
            }
            SubscriptionState::Unsubscribed | SubscriptionState::Rejected => {
                warn!("not subscribed ({}); message discarded", inner.state);
            }
            SubscriptionState::Subscribed => {
                debug!("send message");
                if let Some(connection) = self.connection() {
                    self.dispatch(&*connection, self.message_frame(&message));
                }
            }
        }
    }

    /// Handles a frame that the connection received for this subscription.
    ///
    /// The connection is responsible for routing; the frame's identifier is not checked.
    pub fn received(&self, frame: Value) {
        self.received_message(ServerMessage::from_value(frame));
    }

    /// Parses a JSON frame and handles it as in [`received`](Self::received).
    ///
    /// Returns an error only if the text is not valid JSON.
    pub fn received_json(&self, json: &str) -> Result<(), ParseError> {
        let message = ServerMessage::parse_json(json)?;
        self.received_message(message);
        Ok(())
    }

    /// Handles a classified server frame.
    pub fn received_message(&self, message: ServerMessage) {
        let _guard = self.span.enter();
        debug!("data received: {message:?}");
        match message {
            ServerMessage::ConfirmSubscription => self.subscribed(),
            ServerMessage::RejectSubscription => self.rejected(),
            ServerMessage::Other { kind, message } => {
                let callback = self.on_message.read().clone();
                match (callback, message) {
                    (Some(callback), Some(message)) => callback(&message),
                    _ => warn!(
                        "message type unknown ({})",
                        kind.as_deref().unwrap_or("none")
                    ),
                }
            }
        }
    }

    /// Moves to `Subscribed` and flushes the queue.
    ///
    /// The queue is swapped out in the same critical section as the state change, so a
    /// concurrent `send` is either part of the flush or sent after it.
    fn subscribed(&self) {
        {
            let mut inner = self.inner.lock();
            if !inner.state.is_pending() {
                warn!("ignoring confirmation while {}", inner.state);
                return;
            }
            debug!("subscription confirmed");
            self.set_state(&mut inner, SubscriptionState::Subscribed);
            let queued = std::mem::take(&mut inner.queue);
            if !queued.is_empty() {
                debug!("sending {} queued messages", queued.len());
                if let Some(connection) = self.connection() {
                    for message in queued {
                        self.dispatch(&*connection, self.message_frame(&*message));
                    }
                }
            }
        }
        self.notify_state();
    }

    fn rejected(&self) {
        {
            let mut inner = self.inner.lock();
            if !inner.state.is_pending() {
                warn!("ignoring rejection while {}", inner.state);
                return;
            }
            warn!(
                "subscription rejected; discarding {} queued messages",
                inner.queue.len()
            );
            self.set_state(&mut inner, SubscriptionState::Rejected);
            inner.queue.clear();
        }
        self.notify_state();
    }

    fn set_state(&self, inner: &mut Inner, state: SubscriptionState) {
        debug!("state changed to {state}");
        inner.state = state;
        if self.on_state_event.is_some() {
            inner.events.push_back(state);
        }
    }

    /// Delivers pending state events.
    ///
    /// Must be called without holding the state lock. The notify lock is reentrant, so a
    /// callback that changes the state delivers its own event before returning.
    fn notify_state(&self) {
        let Some(callback) = &self.on_state_event else {
            return;
        };
        let _notify = self.notify.lock();
        loop {
            let event = self.inner.lock().events.pop_front();
            let Some(state) = event else {
                break;
            };
            callback(state, None);
        }
    }

    fn message_frame(&self, message: &dyn OutboundMessage) -> ClientMessage {
        MessageData::new(&self.identifier_string, message.to_wire_format()).into()
    }

    fn connection(&self) -> Option<Arc<dyn Connection>> {
        let connection = self.connection.upgrade();
        if connection.is_none() {
            warn!("connection dropped");
        }
        connection
    }

    fn dispatch(&self, connection: &dyn Connection, frame: ClientMessage) {
        let command = frame.command();
        if let Err(err) = connection.send(frame) {
            warn!("failed to send {command} command: {err}");
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("identifier", &self.identifier_string)
            .field("state", &inner.state)
            .field("queue_len", &inner.queue.len())
            .field("has_on_message", &self.on_message.read().is_some())
            .field("has_on_state_event", &self.on_state_event.is_some())
            .finish()
    }
}
