//! In-memory fakes shared by the crate's unit tests.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDateTime};

use crate::errors::{DatabaseError, Error, Result};
use crate::job_orders::{
    checked_progress, JobOrder, JobOrderError, JobOrderRepositoryTrait, JobOrderStatus,
    JobOrderUpdate, NewJobOrder,
};

fn base_time() -> NaiveDateTime {
    DateTime::from_timestamp(1_700_000_000, 0)
        .unwrap()
        .naive_utc()
}

/// Job order store backed by a vector. Each write advances a fake clock by one
/// second so creation order is deterministic.
#[derive(Clone, Default)]
pub(crate) struct InMemoryJobOrderRepository {
    orders: Arc<Mutex<Vec<JobOrder>>>,
    ticks: Arc<AtomicI64>,
    unavailable: Arc<AtomicBool>,
    reads: Arc<AtomicI64>,
}

impl InMemoryJobOrderRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn now(&self) -> NaiveDateTime {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        base_time() + Duration::seconds(tick)
    }

    /// Simulates the store going away (or coming back).
    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of full list reads served so far.
    pub(crate) fn list_reads(&self) -> i64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Mutates a row behind the service's back, like another writer would.
    pub(crate) fn mutate_externally(&self, order_number: &str, current_qty: i32) {
        let now = self.now();
        let mut orders = self.orders.lock().unwrap();
        if let Some(order) = orders.iter_mut().find(|o| o.order_number == order_number) {
            order.current_qty = current_qty;
            order.percent_completion =
                crate::job_orders::percent_completion(current_qty, order.desired_qty);
            order.updated_at = now;
        }
    }

    pub(crate) fn seed(&self, order_number: &str, desired_qty: i32) {
        let now = self.now();
        self.orders.lock().unwrap().push(JobOrder {
            order_number: order_number.to_string(),
            desired_qty,
            current_qty: 0,
            percent_completion: 0.0,
            status: JobOrderStatus::Ongoing,
            created_at: now,
            updated_at: now,
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::Database(DatabaseError::ConnectionFailed(
                "store offline".to_string(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl JobOrderRepositoryTrait for InMemoryJobOrderRepository {
    fn list_job_orders(&self) -> Result<Vec<JobOrder>> {
        self.check_available()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        let mut orders = self.orders.lock().unwrap().clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    fn get_job_order(&self, order_number: &str) -> Result<JobOrder> {
        self.check_available()?;
        self.orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.order_number == order_number)
            .cloned()
            .ok_or_else(|| JobOrderError::NotFound(order_number.to_string()).into())
    }

    async fn insert_job_order(&self, new_order: NewJobOrder) -> Result<JobOrder> {
        self.check_available()?;
        let now = self.now();
        let mut orders = self.orders.lock().unwrap();
        if orders
            .iter()
            .any(|o| o.order_number == new_order.order_number)
        {
            return Err(JobOrderError::DuplicateKey(new_order.order_number).into());
        }
        let order = JobOrder {
            order_number: new_order.order_number,
            desired_qty: new_order.desired_qty,
            current_qty: 0,
            percent_completion: 0.0,
            status: JobOrderStatus::Ongoing,
            created_at: now,
            updated_at: now,
        };
        orders.push(order.clone());
        Ok(order)
    }

    async fn update_job_order(
        &self,
        order_number: String,
        update: JobOrderUpdate,
    ) -> Result<JobOrder> {
        self.check_available()?;
        let now = self.now();
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| o.order_number == order_number)
            .ok_or_else(|| JobOrderError::NotFound(order_number.clone()))?;
        let percent = checked_progress(&order_number, update.current_qty, order.desired_qty)?;
        order.current_qty = update.current_qty;
        order.percent_completion = percent;
        order.status = update.status;
        order.updated_at = now;
        Ok(order.clone())
    }
}
