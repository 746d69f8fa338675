//! In-process stores. Used when no database is configured, and by the test suites.

use crate::adapters::store::{BroadcastLog, StoreError, TokenStore};
use crate::domain::delivery::{AppUpdateLogEntry, BroadcastReport};
use crate::domain::token::DeviceToken;
use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    tokens: RwLock<Vec<DeviceToken>>,
}

impl InMemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with records as given, duplicates included.
    #[must_use]
    pub fn with_tokens(tokens: Vec<DeviceToken>) -> Self {
        Self { tokens: RwLock::new(tokens) }
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn upsert(&self, token: &str, registered_at: OffsetDateTime) -> Result<(), StoreError> {
        let mut tokens = self.tokens.write().await;
        tokens.retain(|t| t.value != token);
        tokens.push(DeviceToken::new(token, registered_at));
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<DeviceToken>, StoreError> {
        Ok(self.tokens.read().await.clone())
    }

    async fn delete_by_value(&self, token: &str) -> Result<u64, StoreError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|t| t.value != token);
        Ok((before - tokens.len()) as u64)
    }

    async fn delete_older_than(&self, cutoff: OffsetDateTime) -> Result<u64, StoreError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|t| t.registered_at >= cutoff);
        Ok((before - tokens.len()) as u64)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.tokens.read().await.len() as u64)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryBroadcastLog {
    reports: RwLock<Vec<BroadcastReport>>,
    app_updates: RwLock<Vec<AppUpdateLogEntry>>,
}

impl InMemoryBroadcastLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BroadcastLog for InMemoryBroadcastLog {
    async fn append_report(&self, report: &BroadcastReport) -> Result<(), StoreError> {
        self.reports.write().await.push(*report);
        Ok(())
    }

    async fn reports_since(&self, since: OffsetDateTime) -> Result<Vec<BroadcastReport>, StoreError> {
        Ok(self.reports.read().await.iter().filter(|r| r.timestamp >= since).copied().collect())
    }

    async fn append_app_update(&self, entry: &AppUpdateLogEntry) -> Result<(), StoreError> {
        self.app_updates.write().await.push(entry.clone());
        Ok(())
    }

    async fn app_updates_since(&self, since: OffsetDateTime) -> Result<Vec<AppUpdateLogEntry>, StoreError> {
        Ok(self.app_updates.read().await.iter().filter(|e| e.timestamp >= since).cloned().collect())
    }
}
