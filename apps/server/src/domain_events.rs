//! Domain event sink for the web server runtime.
//!
//! Forwards job order mutations to SSE clients as `job-order:*` events. The
//! dashboard view itself is updated by the event mirror, not here.

use orderwatch_core::events::{DomainEvent, DomainEventSink};

use crate::events::{EventBus, ServerEvent, JOB_ORDER_CREATED, JOB_ORDER_UPDATED};

pub struct WebDomainEventSink {
    event_bus: EventBus,
}

impl WebDomainEventSink {
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }
}

impl DomainEventSink for WebDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        let (name, order) = match &event {
            DomainEvent::JobOrderCreated { order } => (JOB_ORDER_CREATED, order),
            DomainEvent::JobOrderUpdated { after, .. } => (JOB_ORDER_UPDATED, after),
        };
        match serde_json::to_value(order) {
            Ok(payload) => self
                .event_bus
                .publish(ServerEvent::with_payload(name, payload)),
            Err(err) => tracing::error!("Failed to serialize {} payload: {}", name, err),
        }
    }
}
