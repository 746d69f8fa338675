use super::present;
use crate::error::AppError;
use crate::services::broadcast::BroadcastSummary;
use crate::services::notification_service::{AppNotification, DownloadProgress};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    pub app_id: Option<String>,
    pub app_name: Option<String>,
    #[serde(rename = "type")]
    pub message_type: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub icon: Option<String>,
    pub download_url: Option<String>,
}

impl SendNotificationRequest {
    /// # Errors
    /// Returns `AppError::Validation` naming every missing required field.
    pub fn validate(self) -> Result<AppNotification, AppError> {
        let (app_id, message_type) = match (present(self.app_id), present(self.message_type)) {
            (Some(app_id), Some(message_type)) => (app_id, message_type),
            (app_id, message_type) => {
                let mut missing = Vec::new();
                if app_id.is_none() {
                    missing.push("appId");
                }
                if message_type.is_none() {
                    missing.push("type");
                }
                return Err(AppError::missing_fields(&missing));
            }
        };

        Ok(AppNotification {
            app_id,
            app_name: present(self.app_name),
            message_type,
            title: present(self.title),
            body: present(self.body),
            icon: present(self.icon),
            download_url: present(self.download_url),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationResponse {
    pub success: bool,
    pub success_count: u64,
    pub failure_count: u64,
    pub total_sent: u64,
    pub message: String,
}

impl From<BroadcastSummary> for SendNotificationResponse {
    fn from(summary: BroadcastSummary) -> Self {
        let report = summary.report;
        Self {
            success: true,
            success_count: report.success_count,
            failure_count: report.failure_count,
            total_sent: report.total_attempted,
            message: format!("Notification sent to {} of {} devices", report.success_count, report.total_attempted),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendProgressRequest {
    pub app_id: Option<String>,
    pub app_name: Option<String>,
    pub progress: Option<i64>,
    pub device_token: Option<String>,
}

impl SendProgressRequest {
    /// Returns the progress update and the target device, if one was named.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if `appId` or `progress` is missing, or `progress` is outside 0..=100.
    pub fn validate(self) -> Result<(DownloadProgress, Option<String>), AppError> {
        let (app_id, progress) = match (present(self.app_id), self.progress) {
            (Some(app_id), Some(progress)) => (app_id, progress),
            (app_id, progress) => {
                let mut missing = Vec::new();
                if app_id.is_none() {
                    missing.push("appId");
                }
                if progress.is_none() {
                    missing.push("progress");
                }
                return Err(AppError::missing_fields(&missing));
            }
        };

        let progress = u8::try_from(progress)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or_else(|| AppError::Validation("progress must be between 0 and 100".into()))?;

        Ok((DownloadProgress { app_id, app_name: present(self.app_name), progress }, present(self.device_token)))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastProgressResponse {
    pub success: bool,
    pub success_count: u64,
    pub failure_count: u64,
}

#[derive(Debug, Serialize)]
pub struct SingleSendResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestNotificationRequest {
    pub token: Option<String>,
    pub app_name: Option<String>,
}

impl TestNotificationRequest {
    /// # Errors
    /// Returns `AppError::Validation` if `token` is missing.
    pub fn validate(self) -> Result<(String, Option<String>), AppError> {
        let token = present(self.token).ok_or_else(|| AppError::missing_fields(&["token"]))?;
        Ok((token, present(self.app_name)))
    }
}
