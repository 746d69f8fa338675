use crate::adapters::store::BroadcastLog;
use crate::domain::app::{AppChange, AppRecord};
use crate::domain::delivery::AppUpdateLogEntry;
use crate::domain::notification::{NotificationPayload, Priority, message_type};
use crate::services::broadcast::{BroadcastEngine, BroadcastError, BroadcastSummary};
use std::sync::Arc;

/// Announces a new app version to every device when an app record's version changes.
#[derive(Clone, Debug)]
pub struct UpdateTrigger {
    engine: BroadcastEngine,
    log: Arc<dyn BroadcastLog>,
}

impl UpdateTrigger {
    #[must_use]
    pub fn new(engine: BroadcastEngine, log: Arc<dyn BroadcastLog>) -> Self {
        Self { engine, log }
    }

    /// Handles an update event. Returns `None` without side effects when the version did not change.
    ///
    /// # Errors
    /// Returns `BroadcastError` if the broadcast could not be performed. No application log entry is written in
    /// that case.
    #[tracing::instrument(skip(self, change), fields(app_id = %change.after.app_id, version = %change.after.version), err)]
    pub async fn on_change(&self, change: &AppChange) -> Result<Option<BroadcastSummary>, BroadcastError> {
        if !change.version_changed() {
            tracing::debug!("Version unchanged, skipping notification");
            return Ok(None);
        }

        tracing::info!(from = %change.before.version, to = %change.after.version, "App version changed");
        let summary = self.engine.broadcast(&Self::build_payload(&change.after)).await?;

        let entry = AppUpdateLogEntry {
            app_id: change.after.app_id.clone(),
            app_name: change.after.name.clone(),
            version: change.after.version.clone(),
            success_count: summary.report.success_count,
            failure_count: summary.report.failure_count,
            total_attempted: summary.report.total_attempted,
            timestamp: summary.report.timestamp,
        };
        if let Err(e) = self.log.append_app_update(&entry).await {
            tracing::error!(error = %e, "Failed to record app update notification");
        }

        Ok(Some(summary))
    }

    #[must_use]
    pub fn build_payload(app: &AppRecord) -> NotificationPayload {
        NotificationPayload::builder(
            format!("{} {} is available", app.name, app.version),
            format!("Tap to download the latest version of {}", app.name),
        )
        .icon(app.icon.as_deref())
        .data("type", message_type::APP_DOWNLOAD_AVAILABLE)
        .data("appId", &app.app_id)
        .data("appName", &app.name)
        .data("version", &app.version)
        .priority(Priority::High)
        .build()
    }
}
