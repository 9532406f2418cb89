//! Domain event types.

use serde::{Deserialize, Serialize};

use crate::job_orders::JobOrder;

/// Domain events emitted by core services after successful mutations.
///
/// These events are facts about job order changes. Runtime adapters translate
/// them into change-stream envelopes, UI notifications, etc.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A job order row was inserted.
    JobOrderCreated { order: JobOrder },

    /// A job order row was updated.
    JobOrderUpdated {
        /// Row image before the update, when it was read.
        before: Option<JobOrder>,
        after: JobOrder,
    },
}

impl DomainEvent {
    /// Creates a JobOrderCreated event.
    pub fn job_order_created(order: JobOrder) -> Self {
        Self::JobOrderCreated { order }
    }

    /// Creates a JobOrderUpdated event.
    pub fn job_order_updated(before: Option<JobOrder>, after: JobOrder) -> Self {
        Self::JobOrderUpdated { before, after }
    }

    /// Key of the affected row.
    pub fn order_number(&self) -> &str {
        match self {
            DomainEvent::JobOrderCreated { order } => &order.order_number,
            DomainEvent::JobOrderUpdated { after, .. } => &after.order_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_orders::JobOrderStatus;
    use chrono::DateTime;

    fn order(number: &str, current_qty: i32) -> JobOrder {
        let ts = DateTime::from_timestamp(1_700_000_000, 0).unwrap().naive_utc();
        JobOrder {
            order_number: number.to_string(),
            desired_qty: 10,
            current_qty,
            percent_completion: f64::from(current_qty) * 10.0,
            status: JobOrderStatus::Ongoing,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_domain_event_serialization() {
        let event = DomainEvent::job_order_updated(Some(order("JO-1", 2)), order("JO-1", 3));

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("job_order_updated"));
        assert!(json.contains("\"orderNumber\":\"JO-1\""));

        let deserialized: DomainEvent = serde_json::from_str(&json).unwrap();
        match deserialized {
            DomainEvent::JobOrderUpdated { before, after } => {
                assert_eq!(before.unwrap().current_qty, 2);
                assert_eq!(after.current_qty, 3);
            }
            _ => panic!("Expected JobOrderUpdated"),
        }
    }

    #[test]
    fn test_order_number_accessor() {
        assert_eq!(
            DomainEvent::job_order_created(order("JO-5", 0)).order_number(),
            "JO-5"
        );
    }
}
