use crate::adapters::push::DeliveryGateway;
use crate::domain::delivery::DeliveryOutcome;
use crate::domain::notification::{NotificationPayload, Priority, message_type};
use crate::error::Result;
use crate::services::broadcast::{BroadcastEngine, BroadcastSummary};
use std::sync::Arc;

/// A manually requested announcement about an app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppNotification {
    pub app_id: String,
    pub app_name: Option<String>,
    pub message_type: String,
    pub title: Option<String>,
    pub body: Option<String>,
    pub icon: Option<String>,
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadProgress {
    pub app_id: String,
    pub app_name: Option<String>,
    pub progress: u8,
}

/// How a progress update was delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressDelivery {
    Single(DeliveryOutcome),
    Broadcast(BroadcastSummary),
}

/// Builds payloads for the HTTP surface and routes them to a single device or to every device.
#[derive(Clone, Debug)]
pub struct NotificationService {
    engine: BroadcastEngine,
    gateway: Arc<dyn DeliveryGateway>,
}

impl NotificationService {
    #[must_use]
    pub fn new(engine: BroadcastEngine, gateway: Arc<dyn DeliveryGateway>) -> Self {
        Self { engine, gateway }
    }

    /// Broadcasts an app announcement to every live device.
    ///
    /// # Errors
    /// Returns `AppError::NoTargets` when no device is registered, or a store/delivery error when the broadcast
    /// could not be performed.
    #[tracing::instrument(skip(self, notification), fields(app_id = %notification.app_id), err)]
    pub async fn send_app_notification(&self, notification: &AppNotification) -> Result<BroadcastSummary> {
        Ok(self.engine.broadcast(&Self::app_payload(notification)).await?)
    }

    /// Sends a download progress update to one device when `device_token` is given, otherwise to every device.
    ///
    /// A single-device send bypasses token reconciliation.
    ///
    /// # Errors
    /// Returns `AppError::NoTargets` for a broadcast with no registered devices, or a store/delivery error.
    #[tracing::instrument(skip(self, progress, device_token), fields(app_id = %progress.app_id, single = device_token.is_some()), err)]
    pub async fn send_progress(
        &self,
        progress: &DownloadProgress,
        device_token: Option<&str>,
    ) -> Result<ProgressDelivery> {
        let payload = Self::progress_payload(progress);
        match device_token {
            Some(token) => Ok(ProgressDelivery::Single(self.gateway.send_to_one(token, &payload).await?)),
            None => Ok(ProgressDelivery::Broadcast(self.engine.broadcast(&payload).await?)),
        }
    }

    /// Sends a test notification to a single device.
    ///
    /// # Errors
    /// Returns `AppError::Delivery` if the provider could not be used.
    #[tracing::instrument(skip(self, token), err)]
    pub async fn send_test(&self, token: &str, app_name: Option<&str>) -> Result<DeliveryOutcome> {
        Ok(self.gateway.send_to_one(token, &Self::test_payload(app_name)).await?)
    }

    #[must_use]
    pub fn app_payload(n: &AppNotification) -> NotificationPayload {
        let app_name = n.app_name.as_deref().unwrap_or(&n.app_id);
        let title = n.title.clone().unwrap_or_else(|| format!("{app_name} update"));
        let body = n.body.clone().unwrap_or_else(|| format!("A new version of {app_name} is available"));

        NotificationPayload::builder(title, body)
            .icon(n.icon.as_deref())
            .data("type", &n.message_type)
            .data("appId", &n.app_id)
            .data("appName", app_name)
            .data_opt("downloadUrl", n.download_url.as_deref())
            .priority(Priority::High)
            .build()
    }

    #[must_use]
    pub fn progress_payload(p: &DownloadProgress) -> NotificationPayload {
        let app_name = p.app_name.as_deref().unwrap_or(&p.app_id);

        NotificationPayload::builder(format!("Downloading {app_name}"), format!("{}% complete", p.progress))
            .data("type", message_type::DOWNLOAD_PROGRESS)
            .data("appId", &p.app_id)
            .data("appName", app_name)
            .data("progress", p.progress.to_string())
            .priority(Priority::Normal)
            .build()
    }

    #[must_use]
    pub fn test_payload(app_name: Option<&str>) -> NotificationPayload {
        let app_name = app_name.unwrap_or("the app");

        NotificationPayload::builder("Test notification", format!("Push notifications are working for {app_name}"))
            .data("type", message_type::TEST)
            .priority(Priority::High)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryBroadcastLog, InMemoryTokenStore};
    use crate::adapters::push::log::LogGateway;
    use crate::adapters::store::TokenStore;
    use crate::error::AppError;
    use crate::services::clock::ManualClock;
    use time::macros::datetime;

    fn service(store: Arc<InMemoryTokenStore>) -> NotificationService {
        let gateway = Arc::new(LogGateway);
        let engine = BroadcastEngine::new(
            store,
            gateway.clone(),
            Arc::new(InMemoryBroadcastLog::new()),
            Arc::new(ManualClock::new(datetime!(2026-01-01 0:00 UTC))),
        );
        NotificationService::new(engine, gateway)
    }

    fn notification() -> AppNotification {
        AppNotification {
            app_id: "app-1".into(),
            app_name: Some("Notes".into()),
            message_type: "NEW_RELEASE".into(),
            title: None,
            body: None,
            icon: None,
            download_url: Some("https://dl.example.com/notes.apk".into()),
        }
    }

    #[test]
    fn test_app_payload_defaults() {
        let payload = NotificationService::app_payload(&notification());

        assert_eq!(payload.title(), "Notes update");
        assert_eq!(payload.body(), "A new version of Notes is available");
        assert_eq!(payload.message_type(), Some("NEW_RELEASE"));
        assert_eq!(payload.data().get("downloadUrl").map(String::as_str), Some("https://dl.example.com/notes.apk"));
    }

    #[test]
    fn test_progress_payload_allows_zero() {
        let payload = NotificationService::progress_payload(&DownloadProgress {
            app_id: "app-1".into(),
            app_name: None,
            progress: 0,
        });

        assert_eq!(payload.title(), "Downloading app-1");
        assert_eq!(payload.body(), "0% complete");
        assert_eq!(payload.data().get("progress").map(String::as_str), Some("0"));
        assert_eq!(payload.message_type(), Some("DOWNLOAD_PROGRESS"));
    }

    #[tokio::test]
    async fn test_single_progress_send_skips_store() {
        let store = Arc::new(InMemoryTokenStore::new());
        let service = service(store);
        let progress = DownloadProgress { app_id: "app-1".into(), app_name: None, progress: 50 };

        let delivery = service.send_progress(&progress, Some("direct-token")).await.unwrap();

        assert_eq!(delivery, ProgressDelivery::Single(DeliveryOutcome::delivered("direct-token")));
    }

    #[tokio::test]
    async fn test_broadcast_without_devices_is_no_targets() {
        let service = service(Arc::new(InMemoryTokenStore::new()));

        let err = service.send_app_notification(&notification()).await.unwrap_err();

        assert!(matches!(err, AppError::NoTargets));
    }

    #[tokio::test]
    async fn test_broadcast_progress_reaches_all_devices() {
        let store = Arc::new(InMemoryTokenStore::new());
        store.upsert("a", datetime!(2026-01-01 0:00 UTC)).await.unwrap();
        store.upsert("b", datetime!(2026-01-01 0:00 UTC)).await.unwrap();
        let service = service(store);
        let progress = DownloadProgress { app_id: "app-1".into(), app_name: None, progress: 75 };

        let ProgressDelivery::Broadcast(summary) = service.send_progress(&progress, None).await.unwrap() else {
            panic!("expected a broadcast");
        };

        assert_eq!(summary.report.success_count, 2);
    }
}
