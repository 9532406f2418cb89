use thiserror::Error;

/// Errors raised by job order commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobOrderError {
    #[error("Job order '{0}' already exists")]
    DuplicateKey(String),

    #[error("Job order '{0}' not found")]
    NotFound(String),

    #[error(
        "Invalid quantity for job order '{order_number}': current quantity {current_qty} must be between 0 and {desired_qty}"
    )]
    InvalidQuantity {
        order_number: String,
        current_qty: i32,
        desired_qty: i32,
    },
}
