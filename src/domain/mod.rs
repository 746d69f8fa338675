pub mod app;
pub mod delivery;
pub mod notification;
pub mod token;
