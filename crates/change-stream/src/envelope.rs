//! Debezium JSON envelopes.
//!
//! A change message is `{op, before, after, source, ts_ms}`. Converters with
//! schemas enabled wrap it as `{schema, payload}`; both shapes are accepted.
//! An empty message or a `null` payload is a tombstone and carries no event.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use orderwatch_core::events::DomainEvent;
use orderwatch_core::job_orders::JobOrder;
use orderwatch_core::mirror::{ChangeEvent, ChangeOperation, StreamError};

/// Source block written by the loopback feed.
pub const LOOPBACK_CONNECTOR: &str = "orderwatch-loopback";
pub const JOB_ORDERS_TABLE: &str = "job_orders";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebeziumEnvelope {
    #[serde(default)]
    pub op: Option<String>,
    #[serde(default)]
    pub before: Option<Value>,
    #[serde(default)]
    pub after: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts_ms: Option<i64>,
}

impl DebeziumEnvelope {
    /// Converts to a mirror event. A missing `op` reads as unknown; the row
    /// image is `after`, falling back to `before`.
    pub fn into_change_event(self) -> ChangeEvent {
        let operation = self
            .op
            .as_deref()
            .map(ChangeOperation::from_op_code)
            .unwrap_or(ChangeOperation::Unknown);
        let image = match self.after {
            Some(Value::Null) | None => self.before,
            after => after,
        };
        ChangeEvent::from_row_image(operation, image)
    }
}

/// Decodes one raw message. `Ok(None)` for tombstones.
pub fn decode_envelope(bytes: &[u8]) -> Result<Option<ChangeEvent>, StreamError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| StreamError::Decode(e.to_string()))?;
    let value = match value {
        Value::Object(mut map) if map.contains_key("schema") && map.contains_key("payload") => {
            map.remove("payload").unwrap_or(Value::Null)
        }
        other => other,
    };
    if value.is_null() {
        return Ok(None);
    }
    let envelope: DebeziumEnvelope =
        serde_json::from_value(value).map_err(|e| StreamError::Decode(e.to_string()))?;
    Ok(Some(envelope.into_change_event()))
}

/// Row image of a job order as the `job_orders` table stores it.
pub fn row_image(order: &JobOrder) -> Value {
    json!({
        "job_order_number": order.order_number,
        "desired_qty": order.desired_qty,
        "current_qty": order.current_qty,
        "percent_completion": order.percent_completion,
        "status": order.status.as_str(),
        "created_at": order.created_at.and_utc().timestamp_millis(),
        "updated_at": order.updated_at.and_utc().timestamp_millis(),
    })
}

/// Envelope describing the row change behind a domain event.
pub fn envelope_for(event: &DomainEvent) -> DebeziumEnvelope {
    let (op, before, after) = match event {
        DomainEvent::JobOrderCreated { order } => ("c", None, row_image(order)),
        DomainEvent::JobOrderUpdated { before, after } => {
            ("u", before.as_ref().map(row_image), row_image(after))
        }
    };
    DebeziumEnvelope {
        op: Some(op.to_string()),
        before,
        after: Some(after),
        source: Some(json!({
            "connector": LOOPBACK_CONNECTOR,
            "table": JOB_ORDERS_TABLE,
        })),
        ts_ms: Some(Utc::now().timestamp_millis()),
    }
}

pub fn encode_domain_event(event: &DomainEvent) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(&envelope_for(event))
}
