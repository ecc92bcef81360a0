use std::any::type_name;

use serde::Serialize;

/// Trait for JSON-serializable frames.
pub trait JsonMessage: Serialize {
    /// Converts the frame to a compact JSON string.
    ///
    /// This is infallible since we control the types that implement this trait
    /// and ensure they can always be serialized to JSON.
    fn to_string(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| panic!("failed to encode {} to JSON", type_name::<Self>()))
    }
}
