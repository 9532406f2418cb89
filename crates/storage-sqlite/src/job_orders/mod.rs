//! SQLite storage implementation for job orders.

mod model;
mod repository;

pub use model::{JobOrderDB, JobOrderProgressDB, NewJobOrderDB};
pub use repository::JobOrderRepository;
