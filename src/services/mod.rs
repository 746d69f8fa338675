pub mod broadcast;
pub mod clock;
pub mod health_service;
pub mod notification_service;
pub mod push_token_service;
pub mod stats;
pub mod update_trigger;
