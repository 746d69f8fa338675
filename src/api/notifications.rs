use crate::api::AppState;
use crate::api::extract::ApiJson;
use crate::api::schemas::notifications::{
    BroadcastProgressResponse, SendNotificationRequest, SendNotificationResponse, SendProgressRequest,
    SingleSendResponse, TestNotificationRequest,
};
use crate::domain::delivery::DeliveryOutcome;
use crate::error::Result;
use crate::services::notification_service::ProgressDelivery;
use axum::{Json, extract::State, response::IntoResponse};

/// Broadcasts an app announcement to every registered device.
///
/// # Errors
/// Returns `AppError::Validation` for missing fields, `AppError::NoTargets` when no device is registered, and a
/// 500-class error if the store or provider is unusable.
pub async fn send_notification(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SendNotificationRequest>,
) -> Result<impl IntoResponse> {
    let notification = payload.validate()?;
    let summary = state.notification_service.send_app_notification(&notification).await?;
    Ok(Json(SendNotificationResponse::from(summary)))
}

/// Sends a download progress update to one device, or to every device when no `deviceToken` is given.
///
/// # Errors
/// Same as [`send_notification`].
pub async fn send_progress(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SendProgressRequest>,
) -> Result<impl IntoResponse> {
    let (progress, device_token) = payload.validate()?;

    let response = match state.notification_service.send_progress(&progress, device_token.as_deref()).await? {
        ProgressDelivery::Single(outcome) => Json(single_send_response(&outcome, "Progress update sent")).into_response(),
        ProgressDelivery::Broadcast(summary) => Json(BroadcastProgressResponse {
            success: true,
            success_count: summary.report.success_count,
            failure_count: summary.report.failure_count,
        })
        .into_response(),
    };
    Ok(response)
}

/// Sends a test notification to the given token.
///
/// # Errors
/// Returns `AppError::Validation` if `token` is missing, or a 500-class error if the provider is unusable.
pub async fn test_notification(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<TestNotificationRequest>,
) -> Result<impl IntoResponse> {
    let (token, app_name) = payload.validate()?;
    let outcome = state.notification_service.send_test(&token, app_name.as_deref()).await?;
    Ok(Json(single_send_response(&outcome, "Test notification sent")))
}

fn single_send_response(outcome: &DeliveryOutcome, sent: &str) -> SingleSendResponse {
    match outcome.error {
        None => SingleSendResponse { success: true, message: sent.to_string() },
        Some(kind) => SingleSendResponse { success: false, message: format!("Delivery failed: {kind}") },
    }
}
