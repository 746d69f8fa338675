use crate::domain::token::DeviceToken;
use time::OffsetDateTime;

#[derive(Debug, sqlx::FromRow)]
pub struct DeviceTokenRecord {
    pub token: String,
    pub registered_at: OffsetDateTime,
}

impl From<DeviceTokenRecord> for DeviceToken {
    fn from(record: DeviceTokenRecord) -> Self {
        Self { value: record.token, registered_at: record.registered_at }
    }
}
