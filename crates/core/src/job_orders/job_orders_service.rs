use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use super::job_orders_model::{JobOrder, JobOrderUpdate, NewJobOrder};
use super::job_orders_traits::{JobOrderRepositoryTrait, JobOrderServiceTrait};
use crate::errors::Result;
use crate::events::{DomainEvent, DomainEventSink};

/// Service for creating and progressing job orders.
///
/// Emits a domain event after every successful mutation. Failed commands leave
/// the store untouched and emit nothing.
pub struct JobOrderService {
    repository: Arc<dyn JobOrderRepositoryTrait>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl JobOrderService {
    pub fn new(
        repository: Arc<dyn JobOrderRepositoryTrait>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            repository,
            event_sink,
        }
    }
}

#[async_trait]
impl JobOrderServiceTrait for JobOrderService {
    fn get_job_orders(&self) -> Result<Vec<JobOrder>> {
        self.repository.list_job_orders()
    }

    fn get_job_order(&self, order_number: &str) -> Result<JobOrder> {
        self.repository.get_job_order(order_number.trim())
    }

    async fn create_job_order(&self, new_order: NewJobOrder) -> Result<JobOrder> {
        new_order.validate()?;
        let new_order = NewJobOrder {
            order_number: new_order.order_number.trim().to_string(),
            ..new_order
        };
        debug!(
            "Creating job order {} (desired qty {})",
            new_order.order_number, new_order.desired_qty
        );

        let created = self.repository.insert_job_order(new_order).await?;
        info!("Job order {} created", created.order_number);
        self.event_sink
            .emit(DomainEvent::job_order_created(created.clone()));
        Ok(created)
    }

    async fn update_job_order(
        &self,
        order_number: String,
        update: JobOrderUpdate,
    ) -> Result<JobOrder> {
        let order_number = order_number.trim().to_string();
        let before = self.repository.get_job_order(&order_number)?;

        let after = self
            .repository
            .update_job_order(order_number, update)
            .await?;
        info!(
            "Job order {} updated: {}/{} ({}%) {}",
            after.order_number,
            after.current_qty,
            after.desired_qty,
            after.percent_completion,
            after.status
        );
        self.event_sink
            .emit(DomainEvent::job_order_updated(Some(before), after.clone()));
        Ok(after)
    }
}
