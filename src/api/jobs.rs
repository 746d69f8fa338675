use crate::api::MgmtState;
use crate::api::schemas::jobs::CleanupResponse;
use crate::error::Result;
use axum::{Json, extract::State, response::IntoResponse};

/// Runs the stale token cleanup once, for external schedulers.
///
/// # Errors
/// Returns `AppError::Store` if the bulk delete fails.
pub async fn cleanup_tokens(State(state): State<MgmtState>) -> Result<impl IntoResponse> {
    let report = state.cleanup.perform_cleanup().await?;
    Ok(Json(CleanupResponse::from(report)))
}
