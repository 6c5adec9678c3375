use std::time::Duration;

use crate::types::{DeliveryMode, WireId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FlushMode {
    /// Flushed on every service update while changes are pending
    #[default]
    Automatic,
    /// Flushed once `flush_interval` has elapsed since the last attempt
    Interval,
    /// Flushed only on explicit request
    Manual,
}

/// Per record type synchronization settings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateConfig {
    pub wire_id: WireId,
    pub delivery_mode: DeliveryMode,
    pub flush_mode: FlushMode,
    pub flush_interval: Duration,
}

impl StateConfig {
    pub fn new(wire_id: WireId) -> Self {
        Self {
            wire_id,
            delivery_mode: DeliveryMode::default(),
            flush_mode: FlushMode::default(),
            flush_interval: Duration::ZERO,
        }
    }

    pub fn delivery_mode(mut self, delivery_mode: DeliveryMode) -> Self {
        self.delivery_mode = delivery_mode;
        self
    }

    pub fn flush_mode(mut self, flush_mode: FlushMode) -> Self {
        self.flush_mode = flush_mode;
        self
    }

    /// Sets the cadence for `FlushMode::Interval` and switches to it
    pub fn flush_interval(mut self, flush_interval: Duration) -> Self {
        self.flush_mode = FlushMode::Interval;
        self.flush_interval = flush_interval;
        self
    }
}
