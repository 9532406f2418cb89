//! Job order domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::job_orders_errors::JobOrderError;
use crate::{errors::ValidationError, Error, Result};

/// Lifecycle status of a job order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobOrderStatus {
    #[default]
    Ongoing,
    Completed,
}

impl JobOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobOrderStatus::Ongoing => "ONGOING",
            JobOrderStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for JobOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobOrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ONGOING" => Ok(JobOrderStatus::Ongoing),
            "COMPLETED" => Ok(JobOrderStatus::Completed),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown job order status '{}'",
                other
            )))),
        }
    }
}

/// Domain model representing a job order row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobOrder {
    pub order_number: String,
    pub desired_qty: i32,
    pub current_qty: i32,
    pub percent_completion: f64,
    pub status: JobOrderStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new job order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJobOrder {
    pub order_number: String,
    pub desired_qty: i32,
}

impl NewJobOrder {
    pub fn new(order_number: impl Into<String>, desired_qty: i32) -> Self {
        Self {
            order_number: order_number.into(),
            desired_qty,
        }
    }

    /// Validates the new job order data.
    pub fn validate(&self) -> Result<()> {
        if self.order_number.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "orderNumber".to_string(),
            )));
        }
        if self.desired_qty < 1 {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Desired quantity must be at least 1, got {}",
                self.desired_qty
            ))));
        }
        Ok(())
    }
}

/// Input model for recording progress on an existing job order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOrderUpdate {
    pub current_qty: i32,
    pub status: JobOrderStatus,
}

impl JobOrderUpdate {
    pub fn new(current_qty: i32, status: JobOrderStatus) -> Self {
        Self {
            current_qty,
            status,
        }
    }
}

/// Completion percentage for `current_qty` out of `desired_qty`.
///
/// Rounded half away from zero to two decimal places. A zero (or negative)
/// desired quantity yields 0.
pub fn percent_completion(current_qty: i32, desired_qty: i32) -> f64 {
    if desired_qty <= 0 {
        return 0.0;
    }
    let raw = f64::from(current_qty) * 100.0 / f64::from(desired_qty);
    (raw * 100.0).round() / 100.0
}

/// Checks `current_qty` against the stored `desired_qty` and returns the
/// recomputed completion percentage.
pub fn checked_progress(
    order_number: &str,
    current_qty: i32,
    desired_qty: i32,
) -> std::result::Result<f64, JobOrderError> {
    if current_qty < 0 || current_qty > desired_qty.max(0) {
        return Err(JobOrderError::InvalidQuantity {
            order_number: order_number.to_string(),
            current_qty,
            desired_qty,
        });
    }
    Ok(percent_completion(current_qty, desired_qty))
}
