use crate::domain::delivery::{AppUpdateLogEntry, BroadcastReport};
use crate::domain::token::DeviceToken;
use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The persisted set of device tokens.
///
/// `list_all` may return the same value more than once when the backing store does not key records by value;
/// callers that deliver to the snapshot are responsible for deduplicating it.
#[async_trait]
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Records `token`, or refreshes its registration time if it is already present.
    ///
    /// # Errors
    /// Returns `StoreError` if the store cannot be reached.
    async fn upsert(&self, token: &str, registered_at: OffsetDateTime) -> Result<(), StoreError>;

    /// Returns a snapshot of every stored token.
    ///
    /// # Errors
    /// Returns `StoreError` if the store cannot be reached. An unreachable store is never reported as empty.
    async fn list_all(&self) -> Result<Vec<DeviceToken>, StoreError>;

    /// Removes every record holding `token`. Deleting a value that is not present is a no-op.
    ///
    /// # Errors
    /// Returns `StoreError` if the store cannot be reached.
    async fn delete_by_value(&self, token: &str) -> Result<u64, StoreError>;

    /// Removes every record registered strictly before `cutoff` in one atomic operation and returns how many
    /// records were removed.
    ///
    /// # Errors
    /// Returns `StoreError` if the store cannot be reached.
    async fn delete_older_than(&self, cutoff: OffsetDateTime) -> Result<u64, StoreError>;

    /// Number of stored token records.
    ///
    /// # Errors
    /// Returns `StoreError` if the store cannot be reached.
    async fn count(&self) -> Result<u64, StoreError>;
}

/// Append-only history of broadcasts, read back by the stats endpoint.
#[async_trait]
pub trait BroadcastLog: Send + Sync + std::fmt::Debug {
    /// # Errors
    /// Returns `StoreError` if the entry could not be written.
    async fn append_report(&self, report: &BroadcastReport) -> Result<(), StoreError>;

    /// # Errors
    /// Returns `StoreError` if the log cannot be read.
    async fn reports_since(&self, since: OffsetDateTime) -> Result<Vec<BroadcastReport>, StoreError>;

    /// # Errors
    /// Returns `StoreError` if the entry could not be written.
    async fn append_app_update(&self, entry: &AppUpdateLogEntry) -> Result<(), StoreError>;

    /// # Errors
    /// Returns `StoreError` if the log cannot be read.
    async fn app_updates_since(&self, since: OffsetDateTime) -> Result<Vec<AppUpdateLogEntry>, StoreError>;
}
