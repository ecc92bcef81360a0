//! Example: chatting on an ActionCable channel
//!
//! Connects to an ActionCable server, subscribes to a channel, and sends every line read from
//! stdin as a message on that channel. Messages broadcast on the channel are printed to stdout.
//!
//! Lines typed before the server confirms the subscription are queued, and delivered once the
//! subscription is confirmed.
//!
//! Run with: cargo run -p example_chat -- --channel ChatChannel --param room=1

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use actioncable::protocol::client::ClientMessage;
use actioncable::{
    ActionCableError, Connection, Identifier, JsonPayload, Subscription, SubscriptionRegistry,
};
use anyhow::Context;
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, ORIGIN, SEC_WEBSOCKET_PROTOCOL};
use tokio_tungstenite::tungstenite::Message;

const SUBPROTOCOL: &str = "actioncable-v1-json";

#[derive(Debug, Parser)]
struct Cli {
    /// ActionCable endpoint.
    #[arg(long, default_value = "ws://localhost:3000/cable")]
    url: String,
    /// Channel class name.
    #[arg(long, default_value = "ChatChannel")]
    channel: String,
    /// Channel parameter, as key=value. May be repeated.
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,
    /// Origin header to send. Rails refuses connections from origins it doesn't allow.
    #[arg(long)]
    origin: Option<String>,
    /// Channel action that handles the messages.
    #[arg(long, default_value = "speak")]
    action: String,
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got {s:?}"))
}

/// A chat line, in the shape a channel action expects.
#[derive(Debug, Serialize)]
struct ChatLine {
    action: String,
    message: String,
}

/// An ActionCable connection over a websocket.
///
/// Frames are handed to a writer task over an unbounded channel, so `send` never blocks.
struct CableConnection {
    welcomed: AtomicBool,
    subscriptions: SubscriptionRegistry,
    outbox: mpsc::UnboundedSender<Message>,
}

impl Connection for CableConnection {
    fn is_connected(&self) -> bool {
        self.welcomed.load(Ordering::Acquire)
    }

    fn subscriptions(&self) -> &SubscriptionRegistry {
        &self.subscriptions
    }

    fn send(&self, frame: ClientMessage) -> Result<(), ActionCableError> {
        self.outbox
            .send(Message::from(&frame))
            .map_err(|_| ActionCableError::ConnectionClosed)
    }
}

impl CableConnection {
    /// Handles connection-level frames, and routes everything else by its identifier.
    fn handle_frame(&self, text: &str) {
        let frame: Value = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!("invalid frame: {err}");
                return;
            }
        };
        match frame.get("type").and_then(Value::as_str) {
            Some("welcome") => {
                tracing::info!("connection established");
                self.welcomed.store(true, Ordering::Release);
                let resumed = self.subscriptions.resume_pending();
                tracing::debug!("resumed {resumed} subscriptions");
                return;
            }
            Some("ping") => return,
            Some("disconnect") => {
                let reason = frame.get("reason").unwrap_or(&Value::Null);
                tracing::info!("server disconnected: {reason}");
                self.welcomed.store(false, Ordering::Release);
                return;
            }
            _ => (),
        }
        let Some(identifier) = frame.get("identifier").and_then(Value::as_str) else {
            tracing::warn!("frame without identifier: {text}");
            return;
        };
        for subscription in self.subscriptions.find_by_identifier(identifier) {
            subscription.received(frame.clone());
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let args = Cli::parse();

    let mut request = args
        .url
        .as_str()
        .into_client_request()
        .context("invalid url")?;
    let headers = request.headers_mut();
    headers.insert(SEC_WEBSOCKET_PROTOCOL, HeaderValue::from_static(SUBPROTOCOL));
    if let Some(origin) = &args.origin {
        headers.insert(ORIGIN, HeaderValue::from_str(origin)?);
    }
    let (ws_stream, _response) = tokio_tungstenite::connect_async(request)
        .await
        .with_context(|| format!("failed to connect to {}", args.url))?;
    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    let (outbox, mut outbox_rx) = mpsc::unbounded_channel();
    let connection = Arc::new(CableConnection {
        welcomed: AtomicBool::new(false),
        subscriptions: SubscriptionRegistry::new(),
        outbox,
    });

    let writer = tokio::spawn(async move {
        while let Some(message) = outbox_rx.recv().await {
            if let Err(err) = ws_sink.send(message).await {
                tracing::warn!("failed to write frame: {err}");
                break;
            }
        }
        _ = ws_sink.close().await;
    });

    let reader = tokio::spawn({
        let connection = connection.clone();
        async move {
            while let Some(message) = ws_stream.next().await {
                match message {
                    Ok(Message::Text(text)) => connection.handle_frame(&text),
                    Ok(Message::Close(_)) => break,
                    Ok(_) => (),
                    Err(err) => {
                        tracing::warn!("websocket error: {err}");
                        break;
                    }
                }
            }
            connection.welcomed.store(false, Ordering::Release);
        }
    });

    let mut identifier = Identifier::channel(&args.channel);
    for (key, value) in args.params {
        identifier = identifier.with(key, value);
    }
    let subscription = Subscription::builder(identifier)
        .on_message(|message| println!("{message}"))
        .on_state_event(|state, _| tracing::info!("subscription {state}"))
        .build(&connection);

    // Not welcomed yet, so this waits for the connection.
    subscription.create();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => subscription.send(JsonPayload(ChatLine {
                    action: args.action.clone(),
                    message: line,
                })),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    subscription.remove();
    reader.abort();
    _ = reader.await;
    // Dropping the last connection handle closes the outbox, so the writer flushes and exits.
    drop(subscription);
    drop(connection);
    _ = writer.await;
    Ok(())
}
