//! Test utilities.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::protocol::client::ClientMessage;
use crate::{
    ActionCableError, Connection, OutboundMessage, SubscriptionRegistry, SubscriptionState,
};

/// A connection that records every frame it is asked to send.
pub struct RecordingConnection {
    connected: AtomicBool,
    subscriptions: SubscriptionRegistry,
    pub recorded: Mutex<Vec<ClientMessage>>,
}

impl RecordingConnection {
    pub fn new(connected: bool) -> Arc<Self> {
        Arc::new(Self {
            connected: AtomicBool::new(connected),
            subscriptions: SubscriptionRegistry::new(),
            recorded: Mutex::default(),
        })
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Relaxed);
    }

    pub fn take_frames(&self) -> Vec<ClientMessage> {
        std::mem::take(&mut *self.recorded.lock())
    }

    /// Takes the recorded frames, in their JSON wire form.
    pub fn take_frames_json(&self) -> Vec<Value> {
        self.take_frames()
            .iter()
            .map(|frame| serde_json::to_value(frame).unwrap())
            .collect()
    }
}

impl Connection for RecordingConnection {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    fn subscriptions(&self) -> &SubscriptionRegistry {
        &self.subscriptions
    }

    fn send(&self, frame: ClientMessage) -> Result<(), ActionCableError> {
        self.recorded.lock().push(frame);
        Ok(())
    }
}

/// A connection that claims to be established, but fails every send.
pub struct ErrorConnection {
    subscriptions: SubscriptionRegistry,
    error: fn() -> ActionCableError,
}

impl ErrorConnection {
    /// Fails sends with [`ActionCableError::ConnectionClosed`].
    pub fn new() -> Arc<Self> {
        Self::with_error(|| ActionCableError::ConnectionClosed)
    }

    pub fn with_error(error: fn() -> ActionCableError) -> Arc<Self> {
        Arc::new(Self {
            subscriptions: SubscriptionRegistry::new(),
            error,
        })
    }
}

impl Connection for ErrorConnection {
    fn is_connected(&self) -> bool {
        true
    }

    fn subscriptions(&self) -> &SubscriptionRegistry {
        &self.subscriptions
    }

    fn send(&self, _frame: ClientMessage) -> Result<(), ActionCableError> {
        Err((self.error)())
    }
}

/// A chat message, as an application would send it.
pub struct TextMessage {
    pub text: String,
}

impl TextMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OutboundMessage for TextMessage {
    fn to_wire_format(&self) -> Value {
        json!({"text": self.text})
    }
}

/// Records the states reported to a state event callback.
#[derive(Clone, Default)]
pub struct StateRecorder(Arc<Mutex<Vec<SubscriptionState>>>);

impl StateRecorder {
    /// Returns a callback that records into this recorder.
    pub fn callback(self) -> impl Fn(SubscriptionState, Option<&Value>) + Send + Sync + 'static {
        move |state: SubscriptionState, data: Option<&Value>| {
            assert!(data.is_none());
            self.0.lock().push(state);
        }
    }

    pub fn take(&self) -> Vec<SubscriptionState> {
        std::mem::take(&mut *self.0.lock())
    }
}
