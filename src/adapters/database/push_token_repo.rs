use crate::adapters::database::DbPool;
use crate::adapters::database::records::DeviceTokenRecord;
use crate::adapters::store::{StoreError, TokenStore};
use crate::domain::token::DeviceToken;
use async_trait::async_trait;
use time::OffsetDateTime;

/// `device_tokens` table, keyed by token value.
#[derive(Clone, Debug)]
pub struct PgTokenStore {
    pool: DbPool,
}

impl PgTokenStore {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    #[tracing::instrument(level = "debug", skip(self, token), err)]
    async fn upsert(&self, token: &str, registered_at: OffsetDateTime) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO device_tokens (token, registered_at)
            VALUES ($1, $2)
            ON CONFLICT (token) DO UPDATE SET registered_at = EXCLUDED.registered_at
            "#,
        )
        .bind(token)
        .bind(registered_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn list_all(&self) -> Result<Vec<DeviceToken>, StoreError> {
        let records = sqlx::query_as::<_, DeviceTokenRecord>("SELECT token, registered_at FROM device_tokens")
            .fetch_all(&self.pool)
            .await?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    #[tracing::instrument(level = "debug", skip(self, token), err)]
    async fn delete_by_value(&self, token: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM device_tokens WHERE token = $1").bind(token).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn delete_older_than(&self, cutoff: OffsetDateTime) -> Result<u64, StoreError> {
        let result =
            sqlx::query("DELETE FROM device_tokens WHERE registered_at < $1").bind(cutoff).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn count(&self) -> Result<u64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM device_tokens").fetch_one(&self.pool).await?;
        Ok(count.cast_unsigned())
    }
}
