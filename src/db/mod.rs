//! Database connection pool for the warehouse Postgres instance.
//!
//! The warehouse tables are owned by the upstream SAP import pipeline; this
//! service only ever reads from them, so one process-wide pool is all the
//! resource management required.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Create a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
