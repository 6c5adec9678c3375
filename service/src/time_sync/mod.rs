mod device_time_status;
mod messages;
mod time_sync_config;
mod time_sync_service;

pub use device_time_status::DeviceTimeStatus;
pub use time_sync_config::TimeSyncConfig;
pub use time_sync_service::{TimeSyncService, TIME_SYNC_WIRE_ID};
