use crate::adapters::push::{DeliveryGateway, PushError};
use crate::domain::delivery::DeliveryOutcome;
use crate::domain::notification::NotificationPayload;
use async_trait::async_trait;

/// Logs every send and reports it delivered. For local development without provider credentials.
#[derive(Debug, Default)]
pub struct LogGateway;

#[async_trait]
impl DeliveryGateway for LogGateway {
    async fn send_to_one(&self, token: &str, payload: &NotificationPayload) -> Result<DeliveryOutcome, PushError> {
        tracing::info!(
            token = %token,
            title = %payload.title(),
            message_type = payload.message_type().unwrap_or_default(),
            "STUB: Sending push notification"
        );
        Ok(DeliveryOutcome::delivered(token))
    }
}
