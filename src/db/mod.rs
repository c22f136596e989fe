pub mod models;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::debug;

use crate::store::StoreError;

/// Connects to Postgres, failing fast when the server is not reachable.
pub async fn create_pool(database_url: &str, connect_timeout: Duration) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(connect_timeout)
        .connect(database_url)
        .await
        .map_err(StoreError::Connection)?;
    Ok(pool)
}

/// Checks that the pool is connected to the database named `expected`.
pub async fn select_database(pool: &PgPool, expected: &str) -> Result<(), StoreError> {
    let (current,): (String,) = sqlx::query_as("SELECT current_database()::text")
        .fetch_one(pool)
        .await?;

    if current != expected {
        return Err(StoreError::DatabaseNotFound {
            expected: expected.to_owned(),
            found: current,
        });
    }

    debug!(database = %current, "Database selected");
    Ok(())
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
