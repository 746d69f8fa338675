use crate::workers::CleanupReport;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub message: String,
    pub deleted_count: u64,
    pub timestamp: String,
}

impl From<CleanupReport> for CleanupResponse {
    fn from(report: CleanupReport) -> Self {
        Self {
            message: format!("Deleted {} stale tokens", report.deleted),
            deleted_count: report.deleted,
            timestamp: report.timestamp.format(&Rfc3339).unwrap_or_default(),
        }
    }
}
