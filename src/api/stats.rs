use crate::api::AppState;
use crate::api::schemas::stats::StatsResponse;
use crate::error::Result;
use axum::{Json, extract::State, response::IntoResponse};

/// # Errors
/// Returns `AppError::Store` if the token count or broadcast history cannot be read.
pub async fn notification_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = state.stats.stats().await?;
    Ok(Json(StatsResponse::from(stats)))
}
