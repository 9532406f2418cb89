//! Orderwatch Core - job order domain and the CDC mirror.
//!
//! This crate contains the domain model, the service layer, and the
//! change-stream-to-view synchronization core. It is database- and
//! broker-agnostic: the snapshot store is reached through
//! [`job_orders::JobOrderRepositoryTrait`] and change streams through
//! [`mirror::ChangeStreamConnector`].

pub mod constants;
pub mod errors;
pub mod events;
pub mod job_orders;
pub mod mirror;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
