//! Change events as seen by the mirror.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::MESSAGE_KEY;

/// Row-level operation carried by a change event.
///
/// `Info` and `Error` never come from the stream itself; the mirror writes them
/// into its history to report consumer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOperation {
    Create,
    Update,
    Delete,
    /// Initial snapshot read emitted by the CDC connector.
    Read,
    Info,
    Error,
    Unknown,
}

impl ChangeOperation {
    /// Maps a Debezium `op` code (`c`, `u`, `d`, `r`) or a spelled-out name.
    pub fn from_op_code(op: &str) -> Self {
        match op.trim().to_ascii_lowercase().as_str() {
            "c" | "create" => ChangeOperation::Create,
            "u" | "update" => ChangeOperation::Update,
            "d" | "delete" => ChangeOperation::Delete,
            "r" | "read" => ChangeOperation::Read,
            _ => ChangeOperation::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeOperation::Create => "create",
            ChangeOperation::Update => "update",
            ChangeOperation::Delete => "delete",
            ChangeOperation::Read => "read",
            ChangeOperation::Info => "info",
            ChangeOperation::Error => "error",
            ChangeOperation::Unknown => "unknown",
        }
    }

    /// True for entries the mirror wrote itself.
    pub fn is_synthetic(&self) -> bool {
        matches!(self, ChangeOperation::Info | ChangeOperation::Error)
    }
}

impl fmt::Display for ChangeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field → value mapping of a row image.
pub type ChangePayload = Map<String, Value>;

/// One entry of the mirror history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub operation: ChangeOperation,
    pub payload: ChangePayload,
    pub observed_at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(operation: ChangeOperation, payload: ChangePayload) -> Self {
        Self {
            operation,
            payload,
            observed_at: Utc::now(),
        }
    }

    /// Builds an event from a row image; non-object images are kept under `value`.
    pub fn from_row_image(operation: ChangeOperation, image: Option<Value>) -> Self {
        let payload = match image {
            Some(Value::Object(map)) => map,
            Some(Value::Null) | None => Map::new(),
            Some(other) => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        Self::new(operation, payload)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ChangeOperation::Info, message_payload(message.into()))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ChangeOperation::Error, message_payload(message.into()))
    }

    pub fn with_observed_at(mut self, observed_at: DateTime<Utc>) -> Self {
        self.observed_at = observed_at;
        self
    }

    /// Human-readable message of a synthetic entry.
    pub fn message(&self) -> Option<&str> {
        self.payload.get(MESSAGE_KEY).and_then(Value::as_str)
    }

    /// Key of the affected job order, when the image carries one.
    pub fn order_number(&self) -> Option<&str> {
        self.payload.get("job_order_number").and_then(Value::as_str)
    }
}

fn message_payload(message: String) -> ChangePayload {
    let mut map = Map::new();
    map.insert(MESSAGE_KEY.to_string(), Value::String(message));
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_op_codes_map_to_operations() {
        assert_eq!(ChangeOperation::from_op_code("c"), ChangeOperation::Create);
        assert_eq!(ChangeOperation::from_op_code("U"), ChangeOperation::Update);
        assert_eq!(ChangeOperation::from_op_code("d"), ChangeOperation::Delete);
        assert_eq!(ChangeOperation::from_op_code("r"), ChangeOperation::Read);
        assert_eq!(ChangeOperation::from_op_code("t"), ChangeOperation::Unknown);
        assert_eq!(ChangeOperation::from_op_code(""), ChangeOperation::Unknown);
    }

    #[test]
    fn test_row_image_payloads() {
        let event = ChangeEvent::from_row_image(
            ChangeOperation::Create,
            Some(json!({"job_order_number": "JO-1", "desired_qty": 5})),
        );
        assert_eq!(event.order_number(), Some("JO-1"));

        let empty = ChangeEvent::from_row_image(ChangeOperation::Delete, None);
        assert!(empty.payload.is_empty());

        let scalar = ChangeEvent::from_row_image(ChangeOperation::Unknown, Some(json!(42)));
        assert_eq!(scalar.payload.get("value"), Some(&json!(42)));
    }

    #[test]
    fn test_synthetic_entries_carry_message() {
        let event = ChangeEvent::error("broker unreachable");
        assert_eq!(event.operation, ChangeOperation::Error);
        assert!(event.operation.is_synthetic());
        assert_eq!(event.message(), Some("broker unreachable"));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["operation"], "error");
        assert!(json.get("observedAt").is_some());
    }
}
