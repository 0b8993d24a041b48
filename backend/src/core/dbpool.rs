use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

use crate::cfg;

pub type DbContext = sqlx::SqlitePool;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    ConnectionFailed(sqlx::Error),

    #[error("Database operation failed: {0}")]
    OperationFailed(#[from] sqlx::Error),
}

pub async fn create_db_context(settings: &cfg::DatabaseSettings) -> Result<DbContext, DbError> {
    let options = SqliteConnectOptions::from_str(&settings.url)
        .map_err(DbError::ConnectionFailed)?
        .create_if_missing(true)
        .foreign_keys(true)
        // concurrent writers wait instead of failing with SQLITE_BUSY
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_with(options)
        .await
        .map_err(DbError::ConnectionFailed)?;

    tracing::info!("Database initialized successfully");
    Ok(pool)
}
