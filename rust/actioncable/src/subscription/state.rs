use std::fmt;

use uuid::Uuid;

/// Uniquely identifies a subscription.
///
/// Used as the key in the connection's [`SubscriptionRegistry`](crate::SubscriptionRegistry).
/// It is never sent to the server.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Allocates a new random ID.
    pub(crate) fn next() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<SubscriptionId> for Uuid {
    fn from(id: SubscriptionId) -> Uuid {
        id.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The lifecycle state of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SubscriptionState {
    /// Not subscribed. Outbound messages are discarded.
    #[default]
    Unsubscribed,
    /// Waiting for the connection to be established before subscribing. Outbound messages are
    /// queued.
    ConnectionPending,
    /// Subscribe command sent, waiting for the server to confirm. Outbound messages are queued.
    Pending,
    /// Confirmed by the server. Outbound messages are sent immediately.
    Subscribed,
    /// Refused by the server. Outbound messages are discarded.
    Rejected,
}

impl SubscriptionState {
    /// Returns true if the subscription is waiting on the connection or the server.
    pub fn is_pending(self) -> bool {
        matches!(self, Self::ConnectionPending | Self::Pending)
    }

    /// Returns the protocol-style name of this state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unsubscribed => "unsubscribed",
            Self::ConnectionPending => "connection_pending",
            Self::Pending => "pending",
            Self::Subscribed => "subscribed",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
