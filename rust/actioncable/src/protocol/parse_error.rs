/// An error encountered while parsing a frame.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The transport delivered a message kind that cannot carry a JSON frame.
    #[error("Unhandled message type")]
    UnhandledMessageType,
    /// Invalid JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
