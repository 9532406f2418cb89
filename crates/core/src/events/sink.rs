//! Domain event sink trait and implementations.

use std::sync::{Arc, Mutex};

use super::DomainEvent;

/// Trait for receiving domain events.
///
/// # Design Rules
///
/// - `emit()` must be fast and non-blocking (no network calls, no DB writes)
/// - Failure to emit must not affect domain operations (best-effort)
pub trait DomainEventSink: Send + Sync {
    /// Emit a single domain event.
    fn emit(&self, event: DomainEvent);

    /// Emit multiple domain events.
    fn emit_batch(&self, events: Vec<DomainEvent>) {
        for event in events {
            self.emit(event);
        }
    }
}

/// Fans each event out to several sinks, in order.
#[derive(Clone, Default)]
pub struct FanoutDomainEventSink {
    sinks: Vec<Arc<dyn DomainEventSink>>,
}

impl FanoutDomainEventSink {
    pub fn new(sinks: Vec<Arc<dyn DomainEventSink>>) -> Self {
        Self { sinks }
    }
}

impl DomainEventSink for FanoutDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        for sink in &self.sinks {
            sink.emit(event.clone());
        }
    }
}

/// Mock sink for testing - collects emitted events.
#[derive(Clone, Default)]
pub struct MockDomainEventSink {
    events: Arc<Mutex<Vec<DomainEvent>>>,
}

impl MockDomainEventSink {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all collected events.
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Clears collected events.
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    /// Returns the number of collected events.
    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    /// Returns true if no events have been collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DomainEventSink for MockDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_orders::{JobOrder, JobOrderStatus};
    use chrono::DateTime;

    fn created(number: &str) -> DomainEvent {
        let ts = DateTime::from_timestamp(0, 0).unwrap().naive_utc();
        DomainEvent::job_order_created(JobOrder {
            order_number: number.to_string(),
            desired_qty: 1,
            current_qty: 0,
            percent_completion: 0.0,
            status: JobOrderStatus::Ongoing,
            created_at: ts,
            updated_at: ts,
        })
    }

    #[test]
    fn test_mock_sink_collects_events() {
        let sink = MockDomainEventSink::new();
        assert!(sink.is_empty());

        sink.emit(created("JO-1"));
        sink.emit_batch(vec![created("JO-2"), created("JO-3")]);
        assert_eq!(sink.len(), 3);

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_fanout_sink_delivers_to_every_sink() {
        let first = MockDomainEventSink::new();
        let second = MockDomainEventSink::new();
        let fanout = FanoutDomainEventSink::new(vec![
            Arc::new(first.clone()),
            Arc::new(second.clone()),
        ]);

        fanout.emit(created("JO-1"));
        assert_eq!(first.len(), 1);
        assert_eq!(second.events()[0].order_number(), "JO-1");
    }
}
