use crate::api::AppState;
use crate::api::extract::ApiJson;
use crate::api::schemas::app_updates::{AppUpdateEvent, AppUpdateResponse};
use crate::error::Result;
use axum::{Json, extract::State, response::IntoResponse};

/// Receives an app record change event and announces the new version when it changed.
///
/// # Errors
/// Returns `AppError::Validation` for an incomplete event, or the broadcast's error when the version changed
/// but the announcement could not be sent.
pub async fn app_updates(
    State(state): State<AppState>,
    ApiJson(event): ApiJson<AppUpdateEvent>,
) -> Result<impl IntoResponse> {
    let change = event.validate()?;
    let summary = state.update_trigger.on_change(&change).await?;
    Ok(Json(AppUpdateResponse::from(summary)))
}
