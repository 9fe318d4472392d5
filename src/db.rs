//! Database pool setup, schema creation and per-request connection scoping.

use std::str::FromStr;

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};

use crate::error::AppError;

pub type DbPool = SqlitePool;
pub type DbConnection = PoolConnection<Sqlite>;

const SCHEMA: &str = include_str!("../sql/schema.sql");

/// Executes a multi-statement SQL script, skipping `--` comment lines.
async fn execute_sql(pool: &DbPool, sql: &str) -> Result<(), sqlx::Error> {
    for statement in sql.split(';') {
        let cleaned: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed = cleaned.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

/// Opens the pool and makes sure the `users` and `tasks` tables exist.
///
/// An in-memory database only lives as long as its connection, so for in-memory
/// URLs (`:memory:` or `mode=memory`) the pool is pinned to a single connection
/// that is never recycled.
pub async fn init(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let in_memory = is_in_memory(database_url);
    let mut pool_options = SqlitePoolOptions::new();
    pool_options = if in_memory {
        pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_options.max_connections(max_connections.max(1))
    };

    log::info!("Initializing database at {}", database_url);
    let pool = pool_options.connect_with(options).await?;

    execute_sql(&pool, SCHEMA).await?;
    log::info!("Database schema ready");

    Ok(pool)
}

fn is_in_memory(database_url: &str) -> bool {
    let query = database_url.split_once('?').map_or("", |(_, query)| query);
    database_url.contains(":memory:") || query.split('&').any(|param| param == "mode=memory")
}

/// Acquires a connection for the duration of one request.
///
/// The connection goes back to the pool when the returned guard is dropped.
pub async fn acquire(pool: &DbPool) -> Result<DbConnection, AppError> {
    Ok(pool.acquire().await?)
}

/// Closes every pooled connection. Called once the HTTP server has stopped.
pub async fn close(pool: &DbPool) {
    log::info!("Closing database pool");
    pool.close().await;
}
