use crate::adapters::store::{BroadcastLog, StoreError, TokenStore};
use crate::services::clock::Clock;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowTotals {
    pub sent: u64,
    pub failed: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationStats {
    pub total_tokens: u64,
    pub success_rate: String,
    pub window: WindowTotals,
}

/// Read-only reporting over the token store and the broadcast log.
#[derive(Clone, Debug)]
pub struct StatsAggregator {
    store: Arc<dyn TokenStore>,
    log: Arc<dyn BroadcastLog>,
    clock: Arc<dyn Clock>,
    window: time::Duration,
}

impl StatsAggregator {
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>, log: Arc<dyn BroadcastLog>, clock: Arc<dyn Clock>, window_days: u32) -> Self {
        Self { store, log, clock, window: time::Duration::days(i64::from(window_days)) }
    }

    /// # Errors
    /// Returns `StoreError` if either the token store or the broadcast log cannot be read.
    #[tracing::instrument(level = "debug", skip(self), err)]
    pub async fn stats(&self) -> Result<NotificationStats, StoreError> {
        let total_tokens = self.store.count().await?;
        let since = self.clock.now() - self.window;

        let window = self.log.reports_since(since).await?.iter().fold(WindowTotals::default(), |acc, r| {
            WindowTotals {
                sent: acc.sent + r.success_count,
                failed: acc.failed + r.failure_count,
                total: acc.total + r.success_count + r.failure_count,
            }
        });

        Ok(NotificationStats { total_tokens, success_rate: success_rate(window.sent, window.failed), window })
    }
}

/// Percentage of successful deliveries with two decimals, or `"0%"` when nothing was attempted.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn success_rate(sent: u64, failed: u64) -> String {
    let attempted = sent + failed;
    if attempted == 0 {
        return "0%".to_string();
    }
    format!("{:.2}%", sent as f64 / attempted as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryBroadcastLog, InMemoryTokenStore};
    use crate::domain::delivery::BroadcastReport;
    use crate::domain::token::DeviceToken;
    use crate::services::clock::ManualClock;
    use time::macros::datetime;

    #[test]
    fn test_success_rate_formatting() {
        assert_eq!(success_rate(0, 0), "0%");
        assert_eq!(success_rate(3, 0), "100.00%");
        assert_eq!(success_rate(1, 2), "33.33%");
        assert_eq!(success_rate(2, 1), "66.67%");
        assert_eq!(success_rate(0, 5), "0.00%");
    }

    #[tokio::test]
    async fn test_stats_only_count_trailing_window() {
        let now = datetime!(2026-03-31 12:00 UTC);
        let store = Arc::new(InMemoryTokenStore::with_tokens(vec![
            DeviceToken::new("a", now),
            DeviceToken::new("b", now),
        ]));
        let log = Arc::new(InMemoryBroadcastLog::new());
        let report = |success_count: u64, failure_count: u64, timestamp| BroadcastReport {
            success_count,
            failure_count,
            total_attempted: success_count + failure_count,
            timestamp,
        };
        log.append_report(&report(100, 100, datetime!(2026-02-01 0:00 UTC))).await.unwrap();
        log.append_report(&report(8, 1, datetime!(2026-03-10 0:00 UTC))).await.unwrap();
        log.append_report(&report(1, 0, datetime!(2026-03-30 0:00 UTC))).await.unwrap();

        let stats = StatsAggregator::new(store, log, Arc::new(ManualClock::new(now)), 30).stats().await.unwrap();

        assert_eq!(stats.total_tokens, 2);
        assert_eq!(stats.window, WindowTotals { sent: 9, failed: 1, total: 10 });
        assert_eq!(stats.success_rate, "90.00%");
    }

    #[tokio::test]
    async fn test_stats_without_broadcasts() {
        let stats = StatsAggregator::new(
            Arc::new(InMemoryTokenStore::new()),
            Arc::new(InMemoryBroadcastLog::new()),
            Arc::new(ManualClock::new(datetime!(2026-03-31 12:00 UTC))),
            30,
        )
        .stats()
        .await
        .unwrap();

        assert_eq!(stats.total_tokens, 0);
        assert_eq!(stats.window, WindowTotals::default());
        assert_eq!(stats.success_rate, "0%");
    }
}
