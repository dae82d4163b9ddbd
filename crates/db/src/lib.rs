//! Postgres persistence for the course publishing workflow.
//!
//! - [`models`] — row structs and DTOs for `courses` and `course_updates`.
//! - [`repositories`] — sqlx repositories providing the record-level
//!   operations the workflow engine composes.
//!
//! Migrations live in `db/migrations` at the workspace root.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}
