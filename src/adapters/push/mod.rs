pub mod fcm;
pub mod log;

use crate::domain::delivery::DeliveryOutcome;
use crate::domain::notification::NotificationPayload;
use async_trait::async_trait;
use thiserror::Error;

/// A failure of the provider call as a whole, as opposed to a per-handle [`DeliveryOutcome`].
#[derive(Error, Debug)]
pub enum PushError {
    #[error("No delivery targets")]
    NoTargets,
    #[error("Push provider rejected our credentials: {0}")]
    Auth(String),
    #[error("External service error: {0}")]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait DeliveryGateway: Send + Sync + std::fmt::Debug {
    /// Sends `payload` to a single handle.
    ///
    /// # Errors
    /// Returns `PushError` only when the provider could not be used at all. A handle the provider refuses is
    /// reported through the returned outcome.
    async fn send_to_one(&self, token: &str, payload: &NotificationPayload) -> Result<DeliveryOutcome, PushError>;

    /// Sends `payload` to every handle in `tokens`.
    ///
    /// The result has exactly one outcome per input handle, in input order.
    ///
    /// # Errors
    /// Returns `PushError::NoTargets` for an empty handle list without contacting the provider, and any error
    /// `send_to_one` surfaces.
    async fn send_to_many(
        &self,
        tokens: &[String],
        payload: &NotificationPayload,
    ) -> Result<Vec<DeliveryOutcome>, PushError> {
        if tokens.is_empty() {
            return Err(PushError::NoTargets);
        }
        let mut outcomes = Vec::with_capacity(tokens.len());
        for token in tokens {
            outcomes.push(self.send_to_one(token, payload).await?);
        }
        Ok(outcomes)
    }
}
