//! The connection a subscription is layered on.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::protocol::client::ClientMessage;
use crate::{ActionCableError, Subscription, SubscriptionId, SubscriptionState};

/// A duplex connection speaking the ActionCable protocol.
///
/// The connection owns the transport. Subscriptions only need to know whether it is
/// established, hand it frames to send, and register themselves in its
/// [`SubscriptionRegistry`]. The connection is expected to route each inbound frame to the
/// matching subscription's [`received`](Subscription::received) method.
pub trait Connection: Send + Sync {
    /// Returns true if the transport is currently established.
    fn is_connected(&self) -> bool;

    /// Returns the registry of subscriptions on this connection.
    fn subscriptions(&self) -> &SubscriptionRegistry;

    /// Writes a frame onto the transport.
    ///
    /// This must not block, and must not synchronously call back into the subscription that
    /// is sending the frame. Errors are logged by the subscription and otherwise ignored.
    fn send(&self, frame: ClientMessage) -> Result<(), ActionCableError>;
}

/// The subscriptions registered on a connection, keyed by [`SubscriptionId`].
///
/// Subscriptions insert themselves when they are built. Nothing removes them automatically,
/// not even [`Subscription::remove`]; use [`SubscriptionRegistry::remove`] to deregister one.
#[derive(Default)]
pub struct SubscriptionRegistry {
    subscriptions: RwLock<HashMap<SubscriptionId, Arc<Subscription>>>,
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscription under its ID.
    pub(crate) fn insert(&self, subscription: Arc<Subscription>) {
        let id = subscription.id();
        debug!("registering subscription {id}");
        self.subscriptions.write().insert(id, subscription);
    }

    /// Returns the subscription with the given ID, if it is registered.
    pub fn get(&self, id: SubscriptionId) -> Option<Arc<Subscription>> {
        self.subscriptions.read().get(&id).cloned()
    }

    /// Deregisters a subscription. Returns the subscription if it was registered.
    pub fn remove(&self, id: SubscriptionId) -> Option<Arc<Subscription>> {
        self.subscriptions.write().remove(&id)
    }

    /// Returns the number of registered subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Returns true if no subscriptions are registered.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.read().is_empty()
    }

    /// Collects all registered subscriptions.
    pub fn collect(&self) -> Vec<Arc<Subscription>> {
        self.subscriptions.read().values().cloned().collect()
    }

    /// Collects the subscriptions whose canonical identifier matches `identifier`.
    ///
    /// Connections can use this to route inbound frames by their `identifier` field.
    pub fn find_by_identifier(&self, identifier: &str) -> Vec<Arc<Subscription>> {
        self.subscriptions
            .read()
            .values()
            .filter(|sub| sub.identifier_string() == identifier)
            .cloned()
            .collect()
    }

    /// Re-subscribes every subscription that is waiting for the connection.
    ///
    /// Connections should call this once the transport is established. Returns the number of
    /// subscriptions that were resumed.
    pub fn resume_pending(&self) -> usize {
        // Collect first, so that create() runs without holding the registry lock.
        let pending: Vec<_> = self
            .collect()
            .into_iter()
            .filter(|sub| sub.state() == SubscriptionState::ConnectionPending)
            .collect();
        for sub in &pending {
            sub.create();
        }
        pending.len()
    }
}

impl fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testutil::RecordingConnection;
    use crate::Identifier;

    #[test]
    fn test_build_registers_once() {
        let connection = RecordingConnection::new(true);
        let registry = connection.subscriptions();
        assert!(registry.is_empty());

        let sub = Subscription::new(&connection, Identifier::channel("A"));
        assert_eq!(registry.len(), 1);
        let found = registry.get(sub.id()).unwrap();
        assert!(Arc::ptr_eq(&found, &sub));

        let other = Subscription::new(&connection, Identifier::channel("A"));
        assert_ne!(sub.id(), other.id());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove_deregisters() {
        let connection = RecordingConnection::new(true);
        let sub = Subscription::new(&connection, Identifier::channel("A"));
        let registry = connection.subscriptions();

        // Unsubscribing does not deregister.
        sub.remove();
        assert!(registry.get(sub.id()).is_some());

        let removed = registry.remove(sub.id()).unwrap();
        assert!(Arc::ptr_eq(&removed, &sub));
        assert!(registry.is_empty());
        assert!(registry.remove(sub.id()).is_none());
    }

    #[test]
    fn test_find_by_identifier() {
        let connection = RecordingConnection::new(true);
        let a = Subscription::new(&connection, Identifier::channel("A").with("room", 1));
        let _b = Subscription::new(&connection, Identifier::channel("B"));
        let registry = connection.subscriptions();

        let found = registry.find_by_identifier(r#"{"channel":"A","room":1}"#);
        assert_eq!(found.len(), 1);
        assert!(Arc::ptr_eq(&found[0], &a));
        assert!(registry
            .find_by_identifier(r#"{"room":1,"channel":"A"}"#)
            .is_empty());
    }

    #[test]
    fn test_resume_pending() {
        let connection = RecordingConnection::new(false);
        let pending = Subscription::new(&connection, Identifier::channel("A"));
        let idle = Subscription::new(&connection, Identifier::channel("B"));
        pending.create();
        pending.send(json!({"queued": true}));
        assert_eq!(pending.state(), SubscriptionState::ConnectionPending);
        assert!(connection.take_frames().is_empty());

        connection.set_connected(true);
        assert_eq!(connection.subscriptions().resume_pending(), 1);
        assert_eq!(pending.state(), SubscriptionState::Pending);
        assert_eq!(idle.state(), SubscriptionState::Unsubscribed);
        assert_eq!(pending.queue_len(), 1);
        assert_eq!(
            connection.take_frames_json(),
            vec![json!({"command": "subscribe", "identifier": r#"{"channel":"A"}"#})]
        );

        // Nothing left to resume.
        assert_eq!(connection.subscriptions().resume_pending(), 0);
    }
}
