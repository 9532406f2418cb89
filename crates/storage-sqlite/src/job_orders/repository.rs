use orderwatch_core::job_orders::{
    checked_progress, JobOrder, JobOrderError, JobOrderRepositoryTrait, JobOrderUpdate,
    NewJobOrder,
};
use orderwatch_core::Result;

use super::model::{JobOrderDB, JobOrderProgressDB, NewJobOrderDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::job_orders;
use crate::schema::job_orders::dsl::*;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::SqliteConnection;
use log::debug;

use std::sync::Arc;

pub struct JobOrderRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl JobOrderRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        JobOrderRepository { pool, writer }
    }
}

fn find_row(conn: &mut SqliteConnection, number: &str) -> Result<JobOrderDB> {
    job_orders
        .filter(job_order_number.eq(number))
        .select(JobOrderDB::as_select())
        .first::<JobOrderDB>(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| JobOrderError::NotFound(number.to_string()).into())
}

fn load_desired_qty(conn: &mut SqliteConnection, number: &str) -> Result<i32> {
    job_orders
        .filter(job_order_number.eq(number))
        .select(desired_qty)
        .first::<i32>(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| JobOrderError::NotFound(number.to_string()).into())
}

#[async_trait]
impl JobOrderRepositoryTrait for JobOrderRepository {
    fn list_job_orders(&self) -> Result<Vec<JobOrder>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = job_orders
            .order((created_at.desc(), id.desc()))
            .select(JobOrderDB::as_select())
            .load::<JobOrderDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(JobOrder::from).collect())
    }

    fn get_job_order(&self, number: &str) -> Result<JobOrder> {
        let mut conn = get_connection(&self.pool)?;
        find_row(&mut conn, number).map(JobOrder::from)
    }

    async fn insert_job_order(&self, new_order: NewJobOrder) -> Result<JobOrder> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<JobOrder> {
                let number = new_order.order_number.clone();
                let row = NewJobOrderDB::from_domain(new_order, Utc::now().naive_utc());

                let inserted = diesel::insert_into(job_orders::table)
                    .values(&row)
                    .returning(JobOrderDB::as_returning())
                    .get_result(conn)
                    .map_err(|e| match e {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            StorageError::Core(JobOrderError::DuplicateKey(number.clone()).into())
                        }
                        other => StorageError::from(other),
                    })?;
                debug!("Inserted job order row {}", inserted.id);
                Ok(JobOrder::from(inserted))
            })
            .await
    }

    async fn update_job_order(&self, number: String, update: JobOrderUpdate) -> Result<JobOrder> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<JobOrder> {
                // Desired quantity is read inside the same transaction as the write.
                let desired = load_desired_qty(conn, &number)?;
                let percent = checked_progress(&number, update.current_qty, desired)?;

                let changes = JobOrderProgressDB {
                    current_qty: update.current_qty,
                    percent_completion: percent,
                    status: update.status.as_str().to_string(),
                    updated_at: Utc::now().naive_utc(),
                };
                let target = job_orders.filter(job_order_number.eq(number.as_str()));
                let updated = diesel::update(target)
                    .set(&changes)
                    .returning(JobOrderDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(JobOrder::from(updated))
            })
            .await
    }
}
