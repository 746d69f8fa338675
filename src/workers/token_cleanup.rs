use crate::adapters::store::TokenStore;
use crate::config::CleanupConfig;
use crate::error::AppError;
use crate::services::clock::Clock;
use opentelemetry::{global, metrics::Counter};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::Instrument;

#[derive(Clone, Debug)]
struct Metrics {
    expired_tokens: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("appcast-server");
        Self {
            expired_tokens: meter
                .u64_counter("push_tokens_expired_total")
                .with_description("Total number of push tokens deleted for exceeding the retention window")
                .build(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    pub deleted: u64,
    pub cutoff: OffsetDateTime,
    pub timestamp: OffsetDateTime,
}

/// Deletes tokens whose registration is older than the retention window, independent of delivery outcomes.
#[derive(Clone, Debug)]
pub struct TokenCleanupWorker {
    store: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
    retention: time::Duration,
    interval_secs: u64,
    metrics: Metrics,
}

impl TokenCleanupWorker {
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>, clock: Arc<dyn Clock>, config: &CleanupConfig) -> Self {
        Self {
            store,
            clock,
            retention: time::Duration::days(i64::from(config.retention_days)),
            interval_secs: config.interval_secs,
            metrics: Metrics::new(),
        }
    }

    pub async fn run(self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        if self.interval_secs == 0 {
            tracing::info!("Token cleanup schedule is disabled (interval = 0)");
            return;
        }

        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));

        while !*shutdown.borrow() {
            tokio::select! {
                _ = interval.tick() => {
                    // Failures are already logged inside perform_cleanup; the loop keeps its schedule.
                    let _ = self.perform_cleanup().instrument(tracing::info_span!("token_cleanup_iteration")).await;
                }
                _ = shutdown.changed() => {}
            }
        }
        tracing::info!("Token cleanup loop shutting down...");
    }

    /// Deletes every token registered before `now - retention`.
    ///
    /// Running it again with no new registrations deletes nothing.
    ///
    /// # Errors
    /// Returns `AppError::Store` if the deletion failed, after logging it.
    #[tracing::instrument(skip(self), err, fields(deleted = tracing::field::Empty))]
    pub async fn perform_cleanup(&self) -> Result<CleanupReport, AppError> {
        let timestamp = self.clock.now();
        let cutoff = timestamp - self.retention;
        tracing::debug!(%cutoff, "Running stale token cleanup...");

        match self.store.delete_older_than(cutoff).await {
            Ok(deleted) => {
                tracing::Span::current().record("deleted", deleted);
                if deleted > 0 {
                    tracing::info!(count = %deleted, "Deleted stale push tokens");
                    self.metrics.expired_tokens.add(deleted, &[]);
                }
                Ok(CleanupReport { deleted, cutoff, timestamp })
            }
            Err(e) => {
                tracing::error!(error = %e, "Cleanup error (push tokens)");
                Err(e.into())
            }
        }
    }
}
