use crate::adapters::push::{DeliveryGateway, PushError};
use crate::adapters::store::{BroadcastLog, StoreError, TokenStore};
use crate::domain::delivery::{BroadcastReport, DeliveryOutcome};
use crate::domain::notification::NotificationPayload;
use crate::domain::token::distinct_values;
use crate::services::clock::Clock;
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::sync::Arc;
use thiserror::Error;

/// Stages a single broadcast moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastPhase {
    Fetching,
    Sending,
    Reconciling,
    Reported,
    Failed,
}

impl BroadcastPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Sending => "sending",
            Self::Reconciling => "reconciling",
            Self::Reported => "reported",
            Self::Failed => "failed",
        }
    }
}

#[derive(Error, Debug)]
pub enum BroadcastError {
    #[error("No live device tokens")]
    NoTargets,
    #[error("Failed to fetch device tokens: {0}")]
    Fetch(#[source] StoreError),
    #[error("Delivery gateway failed: {0}")]
    Delivery(#[source] PushError),
}

impl BroadcastError {
    /// The phase the broadcast was in when it failed.
    #[must_use]
    pub const fn phase(&self) -> BroadcastPhase {
        match self {
            Self::NoTargets | Self::Fetch(_) => BroadcastPhase::Fetching,
            Self::Delivery(_) => BroadcastPhase::Sending,
        }
    }
}

/// What a completed broadcast hands back to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastSummary {
    pub report: BroadcastReport,
    /// Tokens removed from the store because the provider reported them invalid.
    pub pruned: u64,
    /// Invalid tokens whose removal failed. They are retried implicitly by the next broadcast.
    pub prune_failures: u64,
    /// Whether the report made it into the broadcast log.
    pub logged: bool,
}

#[derive(Clone, Debug)]
struct Metrics {
    broadcasts: Counter<u64>,
    sent: Counter<u64>,
    errors: Counter<u64>,
    invalidated_tokens: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("appcast-server");
        Self {
            broadcasts: meter
                .u64_counter("push_broadcasts_total")
                .with_description("Total number of broadcasts, by result")
                .build(),
            sent: meter
                .u64_counter("push_sent_total")
                .with_description("Total number of push notifications successfully sent")
                .build(),
            errors: meter
                .u64_counter("push_errors_total")
                .with_description("Total number of push notification delivery errors")
                .build(),
            invalidated_tokens: meter
                .u64_counter("push_invalidated_tokens_total")
                .with_description("Total number of push tokens removed due to being unregistered")
                .build(),
        }
    }
}

/// Fans a payload out to every live token and reconciles the token store with the provider's verdicts.
///
/// Each call is independent: the only state shared between broadcasts is the token store itself, and
/// concurrent broadcasts may both prune the same token.
#[derive(Clone, Debug)]
pub struct BroadcastEngine {
    store: Arc<dyn TokenStore>,
    gateway: Arc<dyn DeliveryGateway>,
    log: Arc<dyn BroadcastLog>,
    clock: Arc<dyn Clock>,
    metrics: Metrics,
}

impl BroadcastEngine {
    #[must_use]
    pub fn new(
        store: Arc<dyn TokenStore>,
        gateway: Arc<dyn DeliveryGateway>,
        log: Arc<dyn BroadcastLog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, gateway, log, clock, metrics: Metrics::new() }
    }

    /// Delivers `payload` to every distinct live token.
    ///
    /// Per-token delivery failures are counted in the report, not returned as errors. Tokens the provider
    /// reports as invalid are deleted from the store before returning.
    ///
    /// # Errors
    /// Returns `BroadcastError::NoTargets` when the store holds no tokens, `BroadcastError::Fetch` when the store
    /// cannot be read, and `BroadcastError::Delivery` when the provider call itself fails. In every error case
    /// no token has been pruned and nothing has been logged.
    #[tracing::instrument(
        skip(self, payload),
        fields(
            message_type = payload.message_type().unwrap_or_default(),
            phase = tracing::field::Empty,
            targets = tracing::field::Empty,
            success = tracing::field::Empty,
            failure = tracing::field::Empty,
        ),
        err
    )]
    pub async fn broadcast(&self, payload: &NotificationPayload) -> Result<BroadcastSummary, BroadcastError> {
        match self.execute(payload).await {
            Ok(summary) => {
                self.metrics.broadcasts.add(1, &[KeyValue::new("result", "ok")]);
                Ok(summary)
            }
            Err(e) => {
                Self::enter(BroadcastPhase::Failed);
                let reason = match e {
                    BroadcastError::NoTargets => "no_targets",
                    BroadcastError::Fetch(_) => "fetch",
                    BroadcastError::Delivery(_) => "delivery",
                };
                self.metrics.broadcasts.add(1, &[KeyValue::new("result", reason)]);
                tracing::warn!(failed_in = e.phase().as_str(), "Broadcast aborted");
                Err(e)
            }
        }
    }

    async fn execute(&self, payload: &NotificationPayload) -> Result<BroadcastSummary, BroadcastError> {
        let span = tracing::Span::current();

        Self::enter(BroadcastPhase::Fetching);
        let tokens = self.store.list_all().await.map_err(BroadcastError::Fetch)?;
        let targets = distinct_values(tokens);
        if targets.is_empty() {
            return Err(BroadcastError::NoTargets);
        }
        span.record("targets", targets.len());

        Self::enter(BroadcastPhase::Sending);
        let outcomes = self.gateway.send_to_many(&targets, payload).await.map_err(BroadcastError::Delivery)?;
        if outcomes.len() != targets.len() {
            return Err(BroadcastError::Delivery(PushError::Other(anyhow::anyhow!(
                "gateway returned {} outcomes for {} targets",
                outcomes.len(),
                targets.len()
            ))));
        }

        Self::enter(BroadcastPhase::Reconciling);
        self.record_outcomes(&outcomes);
        let (pruned, prune_failures) = self.prune_invalid(&outcomes).await;

        Self::enter(BroadcastPhase::Reported);
        let report = BroadcastReport::from_outcomes(&outcomes, targets.len() as u64, self.clock.now());
        span.record("success", report.success_count);
        span.record("failure", report.failure_count);

        let logged = match self.log.append_report(&report).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to append broadcast report to log");
                false
            }
        };

        tracing::info!(
            success = report.success_count,
            failure = report.failure_count,
            pruned,
            "Broadcast complete"
        );

        Ok(BroadcastSummary { report, pruned, prune_failures, logged })
    }

    fn enter(phase: BroadcastPhase) {
        tracing::Span::current().record("phase", phase.as_str());
    }

    fn record_outcomes(&self, outcomes: &[DeliveryOutcome]) {
        for outcome in outcomes {
            match outcome.error {
                None => self.metrics.sent.add(1, &[]),
                Some(kind) => self.metrics.errors.add(1, &[KeyValue::new("reason", kind.as_str())]),
            }
        }
    }

    /// Deletes every token whose outcome was a permanent failure. A failed deletion is logged and skipped so the
    /// rest of the batch is still reconciled.
    async fn prune_invalid(&self, outcomes: &[DeliveryOutcome]) -> (u64, u64) {
        let mut pruned = 0;
        let mut failures = 0;

        for outcome in outcomes.iter().filter(|o| o.is_permanent_failure()) {
            match self.store.delete_by_value(&outcome.token).await {
                Ok(_) => {
                    tracing::info!(token = %outcome.token, "Pruned invalid token");
                    pruned += 1;
                }
                Err(e) => {
                    tracing::error!(error = %e, token = %outcome.token, "Failed to prune invalid token");
                    failures += 1;
                }
            }
        }

        if pruned > 0 {
            self.metrics.invalidated_tokens.add(pruned, &[]);
        }
        (pruned, failures)
    }
}
