pub mod app_updates;
pub mod health;
pub mod jobs;
pub mod notifications;
pub mod push_tokens;
pub mod stats;

/// Treats absent, empty and whitespace-only strings alike.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
