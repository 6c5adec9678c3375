use std::time::Instant;

use statesync_service::{StateProtocol, StateSyncConfig, StateSyncService};
use statesync_shared::{AppRole, BitCodec, DeviceId};

use crate::local_hub::{LocalHub, LocalTransport};

/// One device of a test session: a sync service and its transport
pub struct TestNode {
    pub service: StateSyncService,
    pub transport: LocalTransport,
}

impl TestNode {
    /// Joins the hub as a disconnected, uninitialized device
    pub fn new(hub: &LocalHub, role: AppRole, protocol: StateProtocol) -> Self {
        Self::with_config(hub, role, protocol, StateSyncConfig::default())
    }

    pub fn with_config(
        hub: &LocalHub,
        role: AppRole,
        protocol: StateProtocol,
        config: StateSyncConfig,
    ) -> Self {
        Self {
            service: StateSyncService::new(config, protocol, BitCodec),
            transport: hub.add_device(role),
        }
    }

    pub fn device(&self) -> DeviceId {
        self.transport.device_id()
    }

    pub fn initialize(&mut self, now: Instant) {
        self.service
            .initialize(&mut self.transport, now)
            .expect("service failed to initialize");
    }

    pub fn connect(&mut self) {
        let device = self.device();
        self.transport.hub().connect(device);
    }

    /// Feeds every queued transport event to the service. Returns how many
    /// were delivered.
    pub fn pump(&mut self, now: Instant) -> usize {
        let events = self.transport.poll_events();
        let count = events.len();
        for event in events {
            self.service.receive_event(&mut self.transport, event, now);
        }
        count
    }

    pub fn update(&mut self, now: Instant) {
        self.service.update(&mut self.transport, now);
    }

    pub fn flush(&mut self, now: Instant) {
        self.service.flush(&mut self.transport, now);
    }
}
