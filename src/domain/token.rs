use std::collections::HashSet;
use time::OffsetDateTime;

/// Maximum accepted length of a device token, in bytes.
pub const MAX_TOKEN_LEN: usize = 4096;

/// A push endpoint for one app installation, as recorded by the token store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceToken {
    pub value: String,
    pub registered_at: OffsetDateTime,
}

impl DeviceToken {
    #[must_use]
    pub fn new(value: impl Into<String>, registered_at: OffsetDateTime) -> Self {
        Self { value: value.into(), registered_at }
    }
}

/// Collapses a store snapshot into the set of distinct token values to deliver to.
///
/// The first occurrence of each value wins, so the relative order of the snapshot is kept.
#[must_use]
pub fn distinct_values(tokens: Vec<DeviceToken>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(tokens.len());
    tokens.into_iter().map(|t| t.value).filter(|value| seen.insert(value.clone())).collect()
}
