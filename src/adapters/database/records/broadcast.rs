use crate::domain::delivery::{AppUpdateLogEntry, BroadcastReport};
use time::OffsetDateTime;

#[derive(Debug, sqlx::FromRow)]
pub struct BroadcastReportRecord {
    pub success_count: i64,
    pub failure_count: i64,
    pub total_attempted: i64,
    pub created_at: OffsetDateTime,
}

impl From<BroadcastReportRecord> for BroadcastReport {
    fn from(record: BroadcastReportRecord) -> Self {
        Self {
            success_count: record.success_count.cast_unsigned(),
            failure_count: record.failure_count.cast_unsigned(),
            total_attempted: record.total_attempted.cast_unsigned(),
            timestamp: record.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct AppUpdateRecord {
    pub app_id: String,
    pub app_name: String,
    pub version: String,
    pub success_count: i64,
    pub failure_count: i64,
    pub total_attempted: i64,
    pub created_at: OffsetDateTime,
}

impl From<AppUpdateRecord> for AppUpdateLogEntry {
    fn from(record: AppUpdateRecord) -> Self {
        Self {
            app_id: record.app_id,
            app_name: record.app_name,
            version: record.version,
            success_count: record.success_count.cast_unsigned(),
            failure_count: record.failure_count.cast_unsigned(),
            total_attempted: record.total_attempted.cast_unsigned(),
            timestamp: record.created_at,
        }
    }
}
