use crate::services::stats::NotificationStats;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct WindowTotalsResponse {
    pub sent: u64,
    pub failed: u64,
    pub total: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_tokens: u64,
    pub success_rate: String,
    #[serde(rename = "last30Days")]
    pub last_30_days: WindowTotalsResponse,
}

impl From<NotificationStats> for StatsResponse {
    fn from(stats: NotificationStats) -> Self {
        Self {
            total_tokens: stats.total_tokens,
            success_rate: stats.success_rate,
            last_30_days: WindowTotalsResponse {
                sent: stats.window.sent,
                failed: stats.window.failed,
                total: stats.window.total,
            },
        }
    }
}
