use std::time::Duration;

/// Contains Config properties which will be used by a TimeSyncService
#[derive(Clone, Debug)]
pub struct TimeSyncConfig {
    /// Clients snap to the target time once they drift further than this
    pub max_sync_delta_drift: Duration,
    /// How often the host broadcasts its target time
    pub time_sync_interval: Duration,
    /// How often the host checks the latency of each device
    pub latency_check_interval: Duration,
    /// Number of recent round trips averaged per device
    pub max_average_latency_values: usize,
    /// Completed checks needed before a device counts as synchronized
    pub min_latency_checks: usize,
}

impl Default for TimeSyncConfig {
    fn default() -> Self {
        Self {
            max_sync_delta_drift: Duration::from_secs(1),
            time_sync_interval: Duration::from_secs(3),
            latency_check_interval: Duration::from_millis(500),
            max_average_latency_values: 10,
            min_latency_checks: 5,
        }
    }
}
