use std::time::Duration;

use heartbeat_common::retry::{retry_async, Backoff};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::migrator;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn create_pool(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(url)
        .await
}

/// Connects with backoff and brings the baseline and report schema up to date.
pub async fn open_database(
    url: &str,
    max_connections: u32,
    backoff: &Backoff,
) -> Result<PgPool, sqlx::Error> {
    let pool = retry_async(backoff, "postgres connect", || create_pool(url, max_connections)).await?;
    let ran = migrator::run_migrations(&pool).await?;
    tracing::info!(applied = ran.len(), "heartbeat schema ready");
    Ok(pool)
}
