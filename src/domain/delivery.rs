use std::fmt;
use time::OffsetDateTime;

/// Why delivery to a single handle failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryErrorKind {
    /// The provider no longer recognises the handle. It should be pruned.
    InvalidHandle,
    /// Provider-side hiccup. The handle stays live.
    TransientFailure,
    /// The sender is being throttled. The handle stays live.
    QuotaExceeded,
}

impl DeliveryErrorKind {
    /// Whether the handle should be removed from the token store.
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        matches!(self, Self::InvalidHandle)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidHandle => "invalid_handle",
            Self::TransientFailure => "transient_failure",
            Self::QuotaExceeded => "quota_exceeded",
        }
    }
}

impl fmt::Display for DeliveryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of delivering one message to one handle. Lives only as long as the send that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub token: String,
    pub error: Option<DeliveryErrorKind>,
}

impl DeliveryOutcome {
    #[must_use]
    pub fn delivered(token: impl Into<String>) -> Self {
        Self { token: token.into(), error: None }
    }

    #[must_use]
    pub fn failed(token: impl Into<String>, kind: DeliveryErrorKind) -> Self {
        Self { token: token.into(), error: Some(kind) }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Whether this outcome requires the handle to be pruned.
    #[must_use]
    pub fn is_permanent_failure(&self) -> bool {
        self.error.is_some_and(DeliveryErrorKind::is_permanent)
    }
}

/// Aggregate counts of one completed broadcast. Append-only once written to the broadcast log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub success_count: u64,
    pub failure_count: u64,
    pub total_attempted: u64,
    pub timestamp: OffsetDateTime,
}

impl BroadcastReport {
    /// Tallies outcomes into a report stamped with `timestamp`.
    #[must_use]
    pub fn from_outcomes(outcomes: &[DeliveryOutcome], total_attempted: u64, timestamp: OffsetDateTime) -> Self {
        let success_count = outcomes.iter().filter(|o| o.is_success()).count() as u64;
        let failure_count = outcomes.len() as u64 - success_count;
        Self { success_count, failure_count, total_attempted, timestamp }
    }
}

/// Application-level record of a broadcast fired by an app version change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppUpdateLogEntry {
    pub app_id: String,
    pub app_name: String,
    pub version: String,
    pub success_count: u64,
    pub failure_count: u64,
    pub total_attempted: u64,
    pub timestamp: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_only_invalid_handle_is_permanent() {
        assert!(DeliveryErrorKind::InvalidHandle.is_permanent());
        assert!(!DeliveryErrorKind::TransientFailure.is_permanent());
        assert!(!DeliveryErrorKind::QuotaExceeded.is_permanent());
    }

    #[test]
    fn test_report_from_outcomes() {
        let outcomes = vec![
            DeliveryOutcome::delivered("a"),
            DeliveryOutcome::failed("b", DeliveryErrorKind::InvalidHandle),
            DeliveryOutcome::failed("c", DeliveryErrorKind::QuotaExceeded),
        ];
        let ts = datetime!(2026-03-01 12:00 UTC);

        let report = BroadcastReport::from_outcomes(&outcomes, 3, ts);

        assert_eq!(report.success_count, 1);
        assert_eq!(report.failure_count, 2);
        assert_eq!(report.total_attempted, 3);
        assert_eq!(report.timestamp, ts);
        assert!(outcomes[1].is_permanent_failure());
        assert!(!outcomes[2].is_permanent_failure());
    }
}
