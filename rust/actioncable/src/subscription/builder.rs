use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex, RwLock};
use serde_json::Value;
use tracing::Span;

use super::{MessageCallback, StateCallback, Subscription, SubscriptionId, SubscriptionState};
use crate::{Connection, Identifier};

/// A builder for a [`Subscription`].
///
/// Created with [`Subscription::builder`].
#[must_use]
pub struct SubscriptionBuilder {
    identifier: Identifier,
    on_message: Option<MessageCallback>,
    on_state_event: Option<StateCallback>,
    parent_span: Option<Span>,
}

impl SubscriptionBuilder {
    /// Creates a builder for a subscription to the identified channel.
    pub fn new(identifier: Identifier) -> Self {
        Self {
            identifier,
            on_message: None,
            on_state_event: None,
            parent_span: None,
        }
    }

    /// Sets the callback invoked with the `message` payload of inbound application frames.
    pub fn on_message(mut self, callback: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_message = Some(Arc::new(callback));
        self
    }

    /// Sets the callback invoked on every state transition.
    ///
    /// The callback receives the new state, and optional data about the transition. Events are
    /// delivered one at a time, in the order the transitions happened, even when transitions
    /// race on different threads.
    pub fn on_state_event(
        mut self,
        callback: impl Fn(SubscriptionState, Option<&Value>) + Send + Sync + 'static,
    ) -> Self {
        self.on_state_event = Some(Arc::new(callback));
        self
    }

    /// Sets the parent of the subscription's tracing span.
    ///
    /// By default, the span's parent is the span that is current when [`build`](Self::build) is
    /// called.
    pub fn parent_span(mut self, span: Span) -> Self {
        self.parent_span = Some(span);
        self
    }

    /// Builds the subscription and registers it with the connection.
    ///
    /// The subscription starts out [`Unsubscribed`](SubscriptionState::Unsubscribed). It keeps
    /// a weak reference to the connection, and is registered in the connection's
    /// [`SubscriptionRegistry`](crate::SubscriptionRegistry) under its [`SubscriptionId`].
    ///
    /// Use [`build_dyn`](Self::build_dyn) if the connection is already a trait object.
    pub fn build<C: Connection + 'static>(self, connection: &Arc<C>) -> Arc<Subscription> {
        let connection: Arc<dyn Connection> = connection.clone();
        self.build_dyn(&connection)
    }

    /// Builds the subscription on a type-erased connection, as in [`build`](Self::build).
    pub fn build_dyn(self, connection: &Arc<dyn Connection>) -> Arc<Subscription> {
        let id = SubscriptionId::next();
        let identifier_string = self.identifier.to_canonical_string();
        let span = match &self.parent_span {
            Some(parent) => tracing::info_span!(
                parent: parent,
                "subscription",
                %id,
                identifier = %identifier_string,
            ),
            None => tracing::info_span!("subscription", %id, identifier = %identifier_string),
        };
        let subscription = Arc::new(Subscription {
            id,
            identifier: self.identifier,
            identifier_string,
            connection: Arc::downgrade(connection),
            inner: Mutex::default(),
            notify: ReentrantMutex::new(()),
            on_message: RwLock::new(self.on_message),
            on_state_event: self.on_state_event,
            span,
        });
        connection.subscriptions().insert(subscription.clone());
        subscription
    }
}
