pub mod broadcast;
pub mod token;

pub use broadcast::{AppUpdateRecord, BroadcastReportRecord};
pub use token::DeviceTokenRecord;
