use crate::adapters::push::PushError;
use crate::adapters::store::StoreError;
use crate::services::broadcast::BroadcastError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("No device tokens registered")]
    NoTargets,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Delivery failed: {0}")]
    Delivery(#[source] PushError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    #[must_use]
    pub fn missing_fields(fields: &[&str]) -> Self {
        Self::Validation(format!("Missing required fields: {}", fields.join(", ")))
    }
}

impl From<PushError> for AppError {
    fn from(err: PushError) -> Self {
        match err {
            PushError::NoTargets => Self::NoTargets,
            other => Self::Delivery(other),
        }
    }
}

impl From<BroadcastError> for AppError {
    fn from(err: BroadcastError) -> Self {
        match err {
            BroadcastError::NoTargets => Self::NoTargets,
            BroadcastError::Fetch(e) => Self::Store(e),
            BroadcastError::Delivery(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(msg) => {
                tracing::debug!(message = %msg, "Validation failed");
                (StatusCode::BAD_REQUEST, msg)
            }
            Self::NoTargets => {
                tracing::debug!("No delivery targets");
                (StatusCode::NOT_FOUND, "No device tokens registered".to_string())
            }
            Self::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string()),
            Self::Delivery(e) => {
                tracing::error!(error = %e, "Delivery error");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Delivery failed: {e}"))
            }
            Self::Store(e) => {
                tracing::error!(error = %e, "Store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Token store unavailable".to_string())
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message
        }));

        (status, body).into_response()
    }
}
