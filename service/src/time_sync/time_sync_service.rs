use std::{
    collections::{HashMap, HashSet, VecDeque},
    time::Duration,
};

use log::{error, warn};

use statesync_shared::{
    from_payload, to_payload, AppRole, DeliveryMode, DeviceId, SendDataArgs, SubscriptionMode,
    Transport, TransportEvent, WireId,
};

use crate::time_sync::{
    messages::{LatencyCheck, LatencyUpdate, TargetTime},
    DeviceTimeStatus, TimeSyncConfig,
};

/// Base of the wire ids used by time sync traffic
pub const TIME_SYNC_WIRE_ID: WireId = 200;
const LATENCY_CHECK_REQUEST: WireId = TIME_SYNC_WIRE_ID + 1;
const LATENCY_CHECK_RESPONSE: WireId = TIME_SYNC_WIRE_ID + 2;
const LATENCY_UPDATE: WireId = TIME_SYNC_WIRE_ID + 3;
const TARGET_TIME: WireId = TIME_SYNC_WIRE_ID + 4;

/// Shares a session clock. The host broadcasts its time and measures each
/// device's latency; clients steer their clock towards the host's time
/// plus their own latency.
pub struct TimeSyncService {
    config: TimeSyncConfig,
    started: bool,
    local_time: f32,
    time: f32,
    target_time: f32,
    delta_time: f32,
    sync_delta: f32,
    last_latency_check_time: f32,
    last_sync_time: f32,
    outstanding_requests: HashSet<DeviceId>,
    latency_values: HashMap<DeviceId, VecDeque<f32>>,
    device_statuses: HashMap<DeviceId, DeviceTimeStatus>,
}

impl TimeSyncService {
    pub fn new(config: TimeSyncConfig) -> Self {
        Self {
            config,
            started: false,
            local_time: 0.0,
            time: 0.0,
            target_time: 0.0,
            delta_time: 0.0,
            sync_delta: 0.0,
            last_latency_check_time: 0.0,
            last_sync_time: 0.0,
            outstanding_requests: HashSet::new(),
            latency_values: HashMap::new(),
            device_statuses: HashMap::new(),
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Session time in seconds, or the local clock before connecting
    pub fn time(&self) -> f32 {
        if self.started {
            self.time
        } else {
            self.local_time
        }
    }

    pub fn target_time(&self) -> f32 {
        if self.started {
            self.target_time
        } else {
            self.local_time
        }
    }

    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Distance between the local clock and the target time after the
    /// last update
    pub fn sync_delta(&self) -> f32 {
        self.sync_delta
    }

    pub fn device_status(&self, device: DeviceId) -> Option<&DeviceTimeStatus> {
        self.device_statuses.get(&device)
    }

    pub fn device_statuses(&self) -> impl Iterator<Item = &DeviceTimeStatus> {
        self.device_statuses.values()
    }

    pub fn update(&mut self, transport: &mut dyn Transport, elapsed: Duration) {
        let delta = elapsed.as_secs_f32();
        self.local_time += delta;

        if !self.started {
            self.delta_time = delta;
            return;
        }

        let previous = self.time;
        match transport.role() {
            AppRole::Client => {
                self.target_time += delta;
                self.time += delta;
                let blend = (delta * 2.0).min(1.0);
                self.time += (self.target_time - self.time) * blend;
                self.sync_delta = self.time - self.target_time;
                if self.sync_delta.abs() > self.config.max_sync_delta_drift.as_secs_f32() {
                    self.time = self.target_time;
                }
            }
            AppRole::Host | AppRole::Peer => {
                self.time += delta;
                self.target_time = self.time;
                self.sync_delta = 0.0;
                self.host_update_devices(transport);
            }
        }
        self.delta_time = self.time - previous;
    }

    pub fn receive_event(&mut self, transport: &mut dyn Transport, event: &TransportEvent) {
        match event {
            TransportEvent::StatusChanged(status) => {
                let started = status.is_connected();
                if started && !self.started {
                    self.time = self.local_time;
                    self.target_time = self.local_time;
                    self.last_sync_time = self.local_time;
                    self.last_latency_check_time = self.local_time;
                }
                self.started = started;
            }
            TransportEvent::DeviceConnected { device, .. } => {
                self.device_statuses
                    .entry(*device)
                    .or_insert_with(|| DeviceTimeStatus::new(*device))
                    .active = true;
            }
            TransportEvent::DeviceDisconnected { device } => {
                if let Some(status) = self.device_statuses.get_mut(device) {
                    status.active = false;
                }
                self.outstanding_requests.remove(device);
            }
            TransportEvent::LocalSubscriptionModeChanged(SubscriptionMode::Manual) => {
                for wire_id in [
                    LATENCY_CHECK_REQUEST,
                    LATENCY_CHECK_RESPONSE,
                    LATENCY_UPDATE,
                    TARGET_TIME,
                ] {
                    transport.set_local_subscription(wire_id, true);
                }
            }
            TransportEvent::LocalSubscriptionModeChanged(_) => {}
            TransportEvent::ReceiveData {
                wire_id,
                payload,
                sender,
            } => self.receive_data(transport, *wire_id, payload, *sender),
        }
    }

    fn receive_data(
        &mut self,
        transport: &mut dyn Transport,
        wire_id: WireId,
        payload: &[u8],
        sender: DeviceId,
    ) {
        match wire_id {
            LATENCY_CHECK_REQUEST => {
                // echo straight back so the host can time the round trip
                self.send(
                    transport,
                    SendDataArgs::targeted(
                        LATENCY_CHECK_RESPONSE,
                        payload.into(),
                        DeliveryMode::Reliable,
                        vec![sender],
                    ),
                );
            }
            LATENCY_CHECK_RESPONSE => match from_payload::<LatencyCheck>(payload) {
                Ok(check) => self.respond_to_latency_check(transport, sender, check),
                Err(err) => warn!("Dropping latency check response from device {}: {}", sender, err),
            },
            LATENCY_UPDATE => match from_payload::<LatencyUpdate>(payload) {
                Ok(update) => self.receive_latency_update(transport.role(), update),
                Err(err) => warn!("Dropping latency update: {}", err),
            },
            TARGET_TIME => match from_payload::<TargetTime>(payload) {
                Ok(target) => self.receive_target_time(transport, target),
                Err(err) => warn!("Dropping host target time: {}", err),
            },
            _ => {}
        }
    }

    fn receive_target_time(&mut self, transport: &dyn Transport, target: TargetTime) {
        if !transport.role().is_client() {
            error!("Only clients receive the host target time");
            return;
        }
        let Some(status) = self.device_statuses.get(&transport.local_device_id()) else {
            error!("Couldn't get local device status when receiving host target time");
            return;
        };
        self.target_time = target.target_time + status.latency;
    }

    fn receive_latency_update(&mut self, role: AppRole, update: LatencyUpdate) {
        if !role.is_client() {
            error!("Only clients receive latency updates");
            return;
        }
        let Some(status) = self.device_statuses.get_mut(&update.device) else {
            error!("Received latency update for unknown device {}", update.device);
            return;
        };
        status.latency = update.latency;
        status.synchronized = update.synchronized;
    }

    fn respond_to_latency_check(
        &mut self,
        transport: &mut dyn Transport,
        device: DeviceId,
        check: LatencyCheck,
    ) {
        if transport.role().is_client() {
            error!("Clients do not measure latency");
            return;
        }
        if !self.device_statuses.contains_key(&device) {
            warn!("No time status for device {} in latency response", device);
            return;
        }
        self.outstanding_requests.remove(&device);

        let round_trip_latency = (self.target_time - check.time_request_sent) / 2.0;
        let values = self.latency_values.entry(device).or_default();
        values.push_back(round_trip_latency);
        while values.len() > self.config.max_average_latency_values.max(1) {
            values.pop_front();
        }
        let latency = values.iter().sum::<f32>() / values.len() as f32;
        let synchronized = values.len() >= self.config.min_latency_checks;

        if let Some(status) = self.device_statuses.get_mut(&device) {
            status.latency = latency;
            status.synchronized = synchronized;
        }

        let update = LatencyUpdate {
            device,
            latency,
            synchronized,
        };
        self.send(
            transport,
            SendDataArgs::skip_sender(LATENCY_UPDATE, to_payload(&update), DeliveryMode::Reliable),
        );
    }

    fn host_update_devices(&mut self, transport: &mut dyn Transport) {
        if self.target_time > self.last_sync_time + self.config.time_sync_interval.as_secs_f32() {
            self.last_sync_time = self.target_time;
            let target = TargetTime {
                target_time: self.target_time,
            };
            self.send(
                transport,
                SendDataArgs::skip_sender(TARGET_TIME, to_payload(&target), DeliveryMode::Reliable),
            );
        }

        if self.target_time
            > self.last_latency_check_time + self.config.latency_check_interval.as_secs_f32()
        {
            self.last_latency_check_time = self.target_time;
            let local_device = transport.local_device_id();
            let mut devices: Vec<DeviceId> = self
                .device_statuses
                .values()
                .filter(|status| status.active && status.device != local_device)
                .map(|status| status.device)
                .filter(|device| !self.outstanding_requests.contains(device))
                .collect();
            devices.sort_unstable();

            let check = to_payload(&LatencyCheck {
                time_request_sent: self.target_time,
            });
            for device in devices {
                self.outstanding_requests.insert(device);
                self.send(
                    transport,
                    SendDataArgs::targeted(
                        LATENCY_CHECK_REQUEST,
                        check.clone(),
                        DeliveryMode::Reliable,
                        vec![device],
                    ),
                );
            }
        }
    }

    fn send(&self, transport: &mut dyn Transport, args: SendDataArgs) {
        let wire_id = args.wire_id;
        if let Err(err) = transport.send_data(args) {
            warn!("Failed to send time sync data on wire id {}: {}", wire_id, err);
        }
    }
}
