use std::time::Duration;

/// Contains Config properties which will be used by a StateSyncService
#[derive(Clone, Debug)]
pub struct StateSyncConfig {
    /// Pause between the container snapshots sent to a synchronizing device
    pub device_sync_delay: Duration,
    /// Whether records added before initialization are flushed as part of it
    pub flush_on_initialize: bool,
}

impl Default for StateSyncConfig {
    fn default() -> Self {
        Self {
            device_sync_delay: Duration::from_millis(350),
            flush_on_initialize: true,
        }
    }
}
