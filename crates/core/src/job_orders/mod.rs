//! Job orders module - domain models, services, and traits.

mod job_orders_errors;
mod job_orders_model;
mod job_orders_service;
mod job_orders_traits;

#[cfg(test)]
mod job_orders_service_tests;

pub use job_orders_errors::JobOrderError;
pub use job_orders_model::{
    checked_progress, percent_completion, JobOrder, JobOrderStatus, JobOrderUpdate, NewJobOrder,
};
pub use job_orders_service::JobOrderService;
pub use job_orders_traits::{JobOrderRepositoryTrait, JobOrderServiceTrait};
