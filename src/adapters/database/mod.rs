pub mod broadcast_log_repo;
pub mod push_token_repo;
pub mod records;

pub use broadcast_log_repo::PgBroadcastLog;
pub use push_token_repo::PgTokenStore;

use crate::config::DatabaseConfig;
use backon::{ExponentialBuilder, Retryable};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;

pub type DbPool = Pool<Postgres>;

/// Initializes the database connection pool, retrying the initial connection with exponential backoff.
///
/// # Errors
/// Returns `sqlx::Error` if the connection still fails after the configured number of retries.
pub async fn init_pool(url: &str, config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let connect = || async {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(url)
            .await
    };

    connect
        .retry(ExponentialBuilder::default().with_max_times(config.connect_retries))
        .notify(|err: &sqlx::Error, dur: Duration| {
            tracing::warn!(error = %err, retry_in_ms = %dur.as_millis(), "Database connection failed, retrying");
        })
        .await
}

/// Applies the embedded schema migrations.
///
/// # Errors
/// Returns `sqlx::migrate::MigrateError` if a migration fails to apply.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!().run(pool).await
}
