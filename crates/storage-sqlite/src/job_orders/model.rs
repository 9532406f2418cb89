//! Database models for job orders.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use log::warn;

use orderwatch_core::job_orders::{JobOrder, JobOrderStatus, NewJobOrder};

/// Database model for job orders
#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::job_orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct JobOrderDB {
    pub id: i32,
    pub job_order_number: String,
    pub desired_qty: i32,
    pub current_qty: i32,
    pub percent_completion: f64,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for creating a new job order
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::job_orders)]
pub struct NewJobOrderDB {
    pub job_order_number: String,
    pub desired_qty: i32,
    pub current_qty: i32,
    pub percent_completion: f64,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Progress columns written by an update
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::job_orders)]
pub struct JobOrderProgressDB {
    pub current_qty: i32,
    pub percent_completion: f64,
    pub status: String,
    pub updated_at: NaiveDateTime,
}

impl NewJobOrderDB {
    /// A fresh order starts at zero progress.
    pub fn from_domain(order: NewJobOrder, now: NaiveDateTime) -> Self {
        Self {
            job_order_number: order.order_number,
            desired_qty: order.desired_qty,
            current_qty: 0,
            percent_completion: 0.0,
            status: JobOrderStatus::Ongoing.as_str().to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<JobOrderDB> for JobOrder {
    fn from(db: JobOrderDB) -> Self {
        let status = db.status.parse().unwrap_or_else(|_| {
            warn!(
                "Job order {} has unknown status '{}', reading it as ONGOING",
                db.job_order_number, db.status
            );
            JobOrderStatus::default()
        });
        Self {
            order_number: db.job_order_number,
            desired_qty: db.desired_qty,
            current_qty: db.current_qty,
            percent_completion: db.percent_completion,
            status,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
