use crate::adapters::database::DbPool;
use crate::adapters::database::records::{AppUpdateRecord, BroadcastReportRecord};
use crate::adapters::store::{BroadcastLog, StoreError};
use crate::domain::delivery::{AppUpdateLogEntry, BroadcastReport};
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct PgBroadcastLog {
    pool: DbPool,
}

impl PgBroadcastLog {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BroadcastLog for PgBroadcastLog {
    #[tracing::instrument(level = "debug", skip(self, report), err)]
    async fn append_report(&self, report: &BroadcastReport) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO broadcast_reports (id, success_count, failure_count, total_attempted, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(report.success_count.cast_signed())
        .bind(report.failure_count.cast_signed())
        .bind(report.total_attempted.cast_signed())
        .bind(report.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn reports_since(&self, since: OffsetDateTime) -> Result<Vec<BroadcastReport>, StoreError> {
        let records = sqlx::query_as::<_, BroadcastReportRecord>(
            r#"
            SELECT success_count, failure_count, total_attempted, created_at
            FROM broadcast_reports
            WHERE created_at >= $1
            ORDER BY created_at
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    #[tracing::instrument(level = "debug", skip(self, entry), fields(app_id = %entry.app_id), err)]
    async fn append_app_update(&self, entry: &AppUpdateLogEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO app_update_log
                (id, app_id, app_name, version, success_count, failure_count, total_attempted, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&entry.app_id)
        .bind(&entry.app_name)
        .bind(&entry.version)
        .bind(entry.success_count.cast_signed())
        .bind(entry.failure_count.cast_signed())
        .bind(entry.total_attempted.cast_signed())
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn app_updates_since(&self, since: OffsetDateTime) -> Result<Vec<AppUpdateLogEntry>, StoreError> {
        let records = sqlx::query_as::<_, AppUpdateRecord>(
            r#"
            SELECT app_id, app_name, version, success_count, failure_count, total_attempted, created_at
            FROM app_update_log
            WHERE created_at >= $1
            ORDER BY created_at
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(records.into_iter().map(Into::into).collect())
    }
}
