use crate::errors::Result;
use crate::job_orders::job_orders_model::{JobOrder, JobOrderUpdate, NewJobOrder};
use async_trait::async_trait;

/// Trait for the job order snapshot store.
///
/// Reads are synchronous against the connection pool; writes go through the
/// store's single writer.
#[async_trait]
pub trait JobOrderRepositoryTrait: Send + Sync {
    /// All job orders, most recently created first.
    fn list_job_orders(&self) -> Result<Vec<JobOrder>>;
    fn get_job_order(&self, order_number: &str) -> Result<JobOrder>;
    async fn insert_job_order(&self, new_order: NewJobOrder) -> Result<JobOrder>;
    /// Applies progress and recomputes the completion percentage from the
    /// stored desired quantity in the same write.
    async fn update_job_order(&self, order_number: String, update: JobOrderUpdate)
        -> Result<JobOrder>;
}

/// Trait for job order service operations
#[async_trait]
pub trait JobOrderServiceTrait: Send + Sync {
    fn get_job_orders(&self) -> Result<Vec<JobOrder>>;
    fn get_job_order(&self, order_number: &str) -> Result<JobOrder>;
    async fn create_job_order(&self, new_order: NewJobOrder) -> Result<JobOrder>;
    async fn update_job_order(&self, order_number: String, update: JobOrderUpdate)
        -> Result<JobOrder>;
}
