//! SQLite snapshot store for Orderwatch.
//!
//! This crate holds all Diesel-specific code: connection pooling, embedded
//! migrations, the single-writer actor and the job order repository that
//! implements `orderwatch_core::job_orders::JobOrderRepositoryTrait`.
//!
//! ```text
//! core (domain)      change-stream
//!       │                  │
//!       └────────┬─────────┘
//!                ▼
//!        storage-sqlite (this crate)
//!                │
//!                ▼
//!            SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

pub mod job_orders;

pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

pub use errors::{IntoCore, StorageError};

pub use orderwatch_core::errors::{DatabaseError, Error, Result};
