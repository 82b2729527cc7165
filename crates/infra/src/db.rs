//! Connection pool construction. Built once at startup and shared via `Arc`
//! across every repository implementation; never mutated afterward.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DbConfig;

pub async fn connect(config: &DbConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.pool_size)
        .idle_timeout(config.idle_timeout)
        .acquire_timeout(config.connection_timeout)
        .connect(&config.connection_string())
        .await
}
