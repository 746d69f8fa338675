use crate::adapters::store::TokenStore;
use crate::error::Result;
use crate::services::clock::Clock;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct PushTokenService {
    store: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
}

impl PushTokenService {
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Registers a push token, or refreshes the registration time of one already known.
    ///
    /// # Errors
    /// Returns `AppError::Store` if the token store is unavailable.
    #[tracing::instrument(level = "debug", skip(self, token), err)]
    pub async fn register_token(&self, token: &str) -> Result<()> {
        self.store.upsert(token, self.clock.now()).await?;
        tracing::debug!("Push token registered");
        Ok(())
    }
}
