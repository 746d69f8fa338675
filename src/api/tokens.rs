use crate::api::AppState;
use crate::api::extract::ApiJson;
use crate::api::schemas::push_tokens::RegisterPushTokenRequest;
use crate::error::Result;
use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

/// Registers a device token, or refreshes its registration time if already known.
///
/// # Errors
/// Returns `AppError::Validation` for a missing or oversized token and `AppError::Store` if the upsert fails.
pub async fn register_token(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterPushTokenRequest>,
) -> Result<impl IntoResponse> {
    let token = payload.validate()?;
    state.push_token_service.register_token(&token).await?;
    Ok(Json(json!({ "success": true })))
}
