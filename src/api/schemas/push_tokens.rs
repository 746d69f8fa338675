use crate::domain::token::MAX_TOKEN_LEN;
use crate::error::AppError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RegisterPushTokenRequest {
    pub token: Option<String>,
}

impl RegisterPushTokenRequest {
    /// Validates the token registration payload and returns the trimmed token.
    ///
    /// # Errors
    /// Returns an error if the token is missing, empty or excessively large (anti-abuse).
    pub fn validate(self) -> Result<String, AppError> {
        let token = super::present(self.token).ok_or_else(|| AppError::missing_fields(&["token"]))?;
        if token.len() > MAX_TOKEN_LEN {
            return Err(AppError::Validation(format!("Token is too long (max {MAX_TOKEN_LEN} characters)")));
        }
        Ok(token)
    }
}
