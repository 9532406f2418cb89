//! Process-local view of job orders plus recent change activity.
//!
//! `ViewState` is the single point of mutation for UI-visible state. Each
//! publish swaps in a complete, immutable [`ViewSnapshot`], so a reader always
//! sees an `(orders, history)` pair that was published together. Subscribers
//! are woken on every publish.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::change_event::ChangeEvent;
use crate::job_orders::JobOrder;

/// One published state of the view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    /// Number of publishes so far; 0 for the initial empty view.
    pub version: u64,
    /// Most recently created first.
    pub orders: Vec<JobOrder>,
    /// Oldest first.
    pub history: Vec<ChangeEvent>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct ViewState {
    sender: Arc<watch::Sender<Arc<ViewSnapshot>>>,
}

impl ViewState {
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(Arc::new(ViewSnapshot::default()));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Current snapshot.
    pub fn read(&self) -> Arc<ViewSnapshot> {
        self.sender.borrow().clone()
    }

    /// Receiver notified after every publish.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ViewSnapshot>> {
        self.sender.subscribe()
    }

    /// Replaces both orders and history. Returns the new version.
    pub fn publish(&self, orders: Vec<JobOrder>, history: Vec<ChangeEvent>) -> u64 {
        self.replace(|_| (orders, history))
    }

    /// Replaces the orders, keeping the current history.
    pub fn publish_orders(&self, orders: Vec<JobOrder>) -> u64 {
        self.replace(|current| (orders, current.history.clone()))
    }

    /// Replaces the history, keeping the current orders.
    pub fn publish_history(&self, history: Vec<ChangeEvent>) -> u64 {
        self.replace(|current| (current.orders.clone(), history))
    }

    fn replace<F>(&self, build: F) -> u64
    where
        F: FnOnce(&ViewSnapshot) -> (Vec<JobOrder>, Vec<ChangeEvent>),
    {
        let mut version = 0;
        self.sender.send_modify(|current| {
            let (orders, history) = build(current);
            version = current.version + 1;
            *current = Arc::new(ViewSnapshot {
                version,
                orders,
                history,
                published_at: Some(Utc::now()),
            });
        });
        version
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_orders::JobOrderStatus;
    use chrono::DateTime;

    fn order(number: &str) -> JobOrder {
        let ts = DateTime::from_timestamp(1_700_000_000, 0).unwrap().naive_utc();
        JobOrder {
            order_number: number.to_string(),
            desired_qty: 10,
            current_qty: 0,
            percent_completion: 0.0,
            status: JobOrderStatus::Ongoing,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_initial_view_is_empty() {
        let view = ViewState::new();
        let snapshot = view.read();
        assert_eq!(snapshot.version, 0);
        assert!(snapshot.orders.is_empty());
        assert!(snapshot.history.is_empty());
        assert!(snapshot.published_at.is_none());
    }

    #[test]
    fn test_publish_replaces_both_fields() {
        let view = ViewState::new();
        view.publish(vec![order("A")], vec![ChangeEvent::info("one")]);
        let version = view.publish(vec![order("B")], vec![ChangeEvent::info("two")]);

        let snapshot = view.read();
        assert_eq!(version, 2);
        assert_eq!(snapshot.version, 2);
        assert_eq!(snapshot.orders.len(), 1);
        assert_eq!(snapshot.orders[0].order_number, "B");
        assert_eq!(snapshot.history[0].message(), Some("two"));
    }

    #[test]
    fn test_partial_publishes_keep_the_other_field() {
        let view = ViewState::new();
        view.publish(vec![order("A")], vec![ChangeEvent::info("kept")]);

        view.publish_orders(vec![order("B"), order("A")]);
        let snapshot = view.read();
        assert_eq!(snapshot.orders.len(), 2);
        assert_eq!(snapshot.history[0].message(), Some("kept"));

        view.publish_history(vec![]);
        let snapshot = view.read();
        assert_eq!(snapshot.orders.len(), 2);
        assert!(snapshot.history.is_empty());
        assert_eq!(snapshot.version, 3);
    }

    #[test]
    fn test_readers_keep_their_snapshot() {
        let view = ViewState::new();
        view.publish(vec![order("A")], vec![]);
        let held = view.read();
        view.publish(vec![], vec![]);
        assert_eq!(held.orders.len(), 1);
        assert!(view.read().orders.is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_are_notified() {
        let view = ViewState::new();
        let mut receiver = view.subscribe();

        let publisher = view.clone();
        tokio::spawn(async move {
            publisher.publish(vec![order("A")], vec![]);
        });

        receiver.changed().await.unwrap();
        let snapshot = receiver.borrow_and_update().clone();
        assert_eq!(snapshot.version, 1);
        assert_eq!(snapshot.orders[0].order_number, "A");
    }
}
