//! Database access
//!
//! SQLite via sqlx. Migrations are embedded at compile time and applied on
//! startup. Repositories own the SQL; handlers never build queries.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::config::DatabaseConfig;

pub mod analytics_repository;
pub mod customer_repository;
pub mod employee_repository;
pub mod order_repository;
pub mod product_repository;
pub mod production_repository;
pub mod user_repository;

pub use analytics_repository::AnalyticsRepository;
pub use customer_repository::CustomerRepository;
pub use employee_repository::EmployeeRepository;
pub use order_repository::OrderRepository;
pub use product_repository::ProductRepository;
pub use production_repository::ProductionRepository;
pub use user_repository::UserRepository;

pub type DbPool = Pool<Sqlite>;

/// Create the connection pool and run pending migrations.
pub async fn init_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .with_context(|| format!("invalid database url: {}", config.url))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect_with(options)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    info!(url = %config.url, "database ready");
    Ok(pool)
}
