use super::present;
use crate::domain::app::{AppChange, AppRecord};
use crate::error::AppError;
use crate::services::broadcast::BroadcastSummary;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRecordDto {
    pub app_id: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub icon: Option<String>,
}

/// A "document changed" event for an app metadata record.
#[derive(Debug, Deserialize)]
pub struct AppUpdateEvent {
    pub before: Option<AppRecordDto>,
    pub after: Option<AppRecordDto>,
}

impl AppRecordDto {
    fn into_record(self, side: &str) -> Result<AppRecord, AppError> {
        let app_id = present(self.app_id);
        let name = present(self.name);
        let version = present(self.version);

        match (app_id, name, version) {
            (Some(app_id), Some(name), Some(version)) => {
                Ok(AppRecord { app_id, name, version, icon: present(self.icon) })
            }
            (app_id, name, version) => {
                let missing: Vec<String> = [("appId", app_id.is_none()), ("name", name.is_none()), ("version", version.is_none())]
                    .into_iter()
                    .filter(|(_, absent)| *absent)
                    .map(|(field, _)| format!("{side}.{field}"))
                    .collect();
                let missing: Vec<&str> = missing.iter().map(String::as_str).collect();
                Err(AppError::missing_fields(&missing))
            }
        }
    }
}

impl AppUpdateEvent {
    /// # Errors
    /// Returns `AppError::Validation` if either side of the change is missing or incomplete.
    pub fn validate(self) -> Result<AppChange, AppError> {
        let (Some(before), Some(after)) = (self.before, self.after) else {
            return Err(AppError::missing_fields(&["before", "after"]));
        };
        Ok(AppChange { before: before.into_record("before")?, after: after.into_record("after")? })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppUpdateResponse {
    pub triggered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_count: Option<u64>,
}

impl From<Option<BroadcastSummary>> for AppUpdateResponse {
    fn from(summary: Option<BroadcastSummary>) -> Self {
        Self {
            triggered: summary.is_some(),
            success_count: summary.as_ref().map(|s| s.report.success_count),
            failure_count: summary.as_ref().map(|s| s.report.failure_count),
        }
    }
}
