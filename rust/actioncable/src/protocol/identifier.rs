//! Channel identifiers.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::ActionCableError;

/// Names a channel, and its parameters, to the server.
///
/// On the wire, the identifier is carried as a string containing compact JSON. The rendering is
/// canonical: the same identifier always produces byte-identical text, and object keys keep the
/// order in which the caller supplied them. Keys are never sorted, since servers may match
/// channels on the exact identifier string.
///
/// ```
/// use actioncable::Identifier;
///
/// let identifier = Identifier::channel("ChatChannel").with("room", "1");
/// assert_eq!(
///     identifier.to_canonical_string(),
///     r#"{"channel":"ChatChannel","room":"1"}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier(Value);

impl Identifier {
    /// Creates an identifier from any serializable value.
    ///
    /// Struct fields are kept in declaration order, and map entries in iteration order.
    pub fn new(value: &impl Serialize) -> Result<Self, ActionCableError> {
        serde_json::to_value(value)
            .map(Self)
            .map_err(ActionCableError::InvalidIdentifier)
    }

    /// Creates an identifier for the named channel, with no parameters.
    pub fn channel(name: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert("channel".to_string(), Value::String(name.into()));
        Self(Value::Object(map))
    }

    /// Adds a channel parameter.
    ///
    /// Parameters are rendered after the ones already present. Setting a parameter that already
    /// exists replaces its value in place. Identifiers that are not JSON objects cannot carry
    /// parameters, and are returned unchanged.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        match &mut self.0 {
            Value::Object(map) => {
                map.insert(key, value.into());
            }
            other => warn!("ignoring parameter {key:?} for non-object identifier {other}"),
        }
        self
    }

    /// Returns the identifier as a JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Returns the canonical JSON text of this identifier.
    pub fn to_canonical_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl From<Value> for Identifier {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<Map<String, Value>> for Identifier {
    fn from(map: Map<String, Value>) -> Self {
        Self(Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use maplit::btreemap;
    use serde::Serialize;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_channel_with_params() {
        let identifier = Identifier::channel("ChatChannel").with("room", "1");
        assert_eq!(
            identifier.to_canonical_string(),
            r#"{"channel":"ChatChannel","room":"1"}"#
        );
    }

    #[test]
    fn test_sorted_map() {
        let params = btreemap! {
            "room" => "1",
            "channel" => "ChatChannel",
        };
        let identifier = Identifier::new(&params).unwrap();
        assert_eq!(
            identifier.to_canonical_string(),
            r#"{"channel":"ChatChannel","room":"1"}"#
        );
    }

    #[test]
    fn test_preserves_key_order() {
        let identifier = Identifier::from(json!({"room": "1", "channel": "ChatChannel"}));
        assert_eq!(
            identifier.to_canonical_string(),
            r#"{"room":"1","channel":"ChatChannel"}"#
        );

        let identifier = Identifier::from(json!({"zeta": 1, "alpha": {"y": 2, "x": 3}}));
        assert_eq!(
            identifier.to_canonical_string(),
            r#"{"zeta":1,"alpha":{"y":2,"x":3}}"#
        );
    }

    #[test]
    fn test_struct_field_order() {
        #[derive(Serialize)]
        struct Params {
            room: &'static str,
            channel: &'static str,
            page: u32,
        }

        let identifier = Identifier::new(&Params {
            room: "lobby",
            channel: "ChatChannel",
            page: 2,
        })
        .unwrap();
        assert_eq!(
            identifier.to_canonical_string(),
            r#"{"room":"lobby","channel":"ChatChannel","page":2}"#
        );
    }

    #[test]
    fn test_canonical_string_is_deterministic() {
        let identifier = Identifier::channel("ChatChannel")
            .with("room", "1")
            .with("tags", json!(["a", "b"]))
            .with("limit", 10);
        let first = identifier.to_canonical_string();
        for _ in 0..10 {
            assert_eq!(identifier.to_canonical_string(), first);
        }
        assert_eq!(identifier.clone().to_canonical_string(), first);
    }

    #[test]
    fn test_replacing_param_keeps_position() {
        let identifier = Identifier::channel("ChatChannel")
            .with("room", "1")
            .with("user", "bob")
            .with("room", "2");
        assert_eq!(
            identifier.to_canonical_string(),
            r#"{"channel":"ChatChannel","room":"2","user":"bob"}"#
        );
    }

    #[test]
    fn test_non_object_identifier() {
        let identifier = Identifier::from(json!("ChatChannel")).with("room", "1");
        assert_eq!(identifier.to_canonical_string(), r#""ChatChannel""#);
    }

    #[test]
    fn test_invalid_identifier() {
        use std::collections::HashMap;

        // JSON object keys must be strings.
        let mut params = HashMap::new();
        params.insert((1, 2), "value");
        assert_matches!(
            Identifier::new(&params),
            Err(ActionCableError::InvalidIdentifier(_))
        );
    }
}
