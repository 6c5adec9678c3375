use std::{
    collections::{HashMap, HashSet},
    time::Instant,
};

use log::{debug, error, info, warn};

use statesync_shared::{
    AppRole, ConnectStatus, DeliveryMode, DeviceId, FlushMode, SendDataArgs, StateCodec,
    StateContainer, StateContainerBase, StateError, StateIter, StateKey, StateKind, StateRecord,
    SubscriptionMode, Transport, TransportEvent, WireId, WriteMode, SYNC_REQUEST_WIRE_ID,
};

use crate::{
    handshake::HandshakeTask,
    outbound_pipe::OutboundPipe,
    protocol::{StateGenerator, StateKinds, StateProtocol, StateRegistration},
    ConfigurationError, StateEvents, StateSyncConfig, SyncStatus,
};

/// Keeps every registered state type in sync across the session: routes
/// received payloads to their containers, answers full-sync requests and
/// flushes local edits on each container's cadence.
pub struct StateSyncService {
    config: StateSyncConfig,
    codec: Box<dyn StateCodec>,
    state_kinds: StateKinds,
    generators: Vec<Box<dyn StateGenerator>>,
    containers: Vec<Box<dyn StateContainerBase>>,
    kind_to_index: HashMap<StateKind, usize>,
    wire_to_index: HashMap<WireId, usize>,
    sync_tasks: HashMap<DeviceId, HandshakeTask>,
    awaiting_snapshots: HashSet<WireId>,
    status: SyncStatus,
    connect_status: ConnectStatus,
    initialized: bool,
    synchronized: bool,
    events: StateEvents,
}

impl StateSyncService {
    pub fn new<C: StateCodec + 'static>(
        config: StateSyncConfig,
        protocol: StateProtocol,
        codec: C,
    ) -> Self {
        let StateProtocol {
            state_kinds,
            generators,
        } = protocol;

        Self {
            config,
            codec: Box::new(codec),
            state_kinds,
            generators,
            containers: Vec::new(),
            kind_to_index: HashMap::new(),
            wire_to_index: HashMap::new(),
            sync_tasks: HashMap::new(),
            awaiting_snapshots: HashSet::new(),
            status: SyncStatus::Uninitialized,
            connect_status: ConnectStatus::Disconnected,
            initialized: false,
            synchronized: false,
            events: StateEvents::new(),
        }
    }

    /// Creates a container for every protocol state type, seeds required
    /// records and flushes them. Failed registrations are logged and
    /// skipped; an invalid codec aborts.
    pub fn initialize(
        &mut self,
        transport: &mut dyn Transport,
        now: Instant,
    ) -> Result<(), ConfigurationError> {
        if self.status != SyncStatus::Uninitialized {
            return Err(ConfigurationError::AlreadyInitialized);
        }
        self.status = SyncStatus::Initializing;

        if let Err(source) = self.codec.validate() {
            error!("State codec failed validation, aborting initialization: {}", source);
            self.status = SyncStatus::Uninitialized;
            return Err(ConfigurationError::InvalidCodec { source });
        }

        let mut seen = HashSet::new();

        let state_kinds = std::mem::take(&mut self.state_kinds);
        for registration in state_kinds.iter() {
            if !seen.insert(registration.kind()) {
                warn!("Duplicate state type found in protocol: {} - skipping.", registration.kind());
                continue;
            }
            self.register_logged(*registration);
        }

        let generators = std::mem::take(&mut self.generators);
        for generator in &generators {
            for registration in generator.state_kinds().iter() {
                if !seen.insert(registration.kind()) {
                    warn!(
                        "Duplicate state type found in generator {}: {} - skipping.",
                        generator.name(),
                        registration.kind()
                    );
                    continue;
                }
                self.register_logged(*registration);
            }
        }
        for generator in &generators {
            if let Err(err) = generator.generate_required_states(self) {
                error!(
                    "State generator {} failed to generate required states: {}",
                    generator.name(),
                    err
                );
            }
        }
        self.generators = generators;

        if self.config.flush_on_initialize {
            self.flush(transport, now);
        }

        self.status = SyncStatus::AwaitingConnection;
        info!(
            "StateSyncService initialized with {} state types",
            self.containers.len()
        );
        Ok(())
    }

    /// Registers a container for `R`, failing if the type or its wire id
    /// is already taken or the wire id is reserved
    pub fn register_state<R: StateRecord>(&mut self) -> Result<(), ConfigurationError> {
        self.register(StateRegistration::of::<R>())
    }

    fn register_logged(&mut self, registration: StateRegistration) {
        if let Err(err) = self.register(registration) {
            error!("Failed to register state type {}: {}", registration.kind(), err);
        }
    }

    fn register(&mut self, registration: StateRegistration) -> Result<(), ConfigurationError> {
        let kind = registration.kind();
        if self.kind_to_index.contains_key(&kind) {
            return Err(ConfigurationError::AlreadyRegistered { kind: kind.name() });
        }

        let container = registration.build()?;
        let wire_id = container.wire_id();
        if wire_id == SYNC_REQUEST_WIRE_ID {
            return Err(ConfigurationError::ReservedWireId {
                kind: kind.name(),
                wire_id,
            });
        }
        if let Some(existing) = self.wire_to_index.get(&wire_id) {
            return Err(ConfigurationError::WireIdCollision {
                kind: kind.name(),
                wire_id,
                existing: self.containers[*existing].kind().name(),
            });
        }

        let index = self.containers.len();
        self.containers.push(container);
        self.kind_to_index.insert(kind, index);
        self.wire_to_index.insert(wire_id, index);
        debug!("Registered state type {} on wire id {}", kind, wire_id);
        Ok(())
    }

    // Status

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn connect_status(&self) -> ConnectStatus {
        self.connect_status
    }

    /// True once the local device has connected
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Set as soon as the local device connects, without waiting for the
    /// full sync to arrive. Use `status()` to learn whether it has.
    pub fn is_synchronized(&self) -> bool {
        self.synchronized
    }

    pub fn is_synchronizing_device(&self, device: DeviceId) -> bool {
        self.sync_tasks.contains_key(&device)
    }

    /// Wire ids already sent to a device whose handshake is in flight
    pub fn handshake_progress(&self, device: DeviceId) -> Option<&[WireId]> {
        self.sync_tasks.get(&device).map(|task| task.sent())
    }

    // Reads

    /// Registered state types, in registration order
    pub fn state_kinds(&self) -> impl Iterator<Item = StateKind> + '_ {
        self.containers.iter().map(|container| container.kind())
    }

    pub fn state_container<R: StateRecord>(&self) -> Result<&StateContainer<R>, StateError> {
        let index = self.index_of::<R>()?;
        self.containers
            .get(index)
            .and_then(|container| container.as_any().downcast_ref::<StateContainer<R>>())
            .ok_or(StateError::UnknownType {
                kind: StateKind::of::<R>().name(),
            })
    }

    fn state_container_mut<R: StateRecord>(
        &mut self,
    ) -> Result<&mut StateContainer<R>, StateError> {
        let index = self.index_of::<R>()?;
        self.containers
            .get_mut(index)
            .and_then(|container| container.as_any_mut().downcast_mut::<StateContainer<R>>())
            .ok_or(StateError::UnknownType {
                kind: StateKind::of::<R>().name(),
            })
    }

    pub fn container(&self, kind: &StateKind) -> Option<&dyn StateContainerBase> {
        let index = self.kind_to_index.get(kind)?;
        self.containers.get(*index).map(|container| container.as_ref())
    }

    pub fn container_by_wire_id(&self, wire_id: WireId) -> Option<&dyn StateContainerBase> {
        let index = self.wire_to_index.get(&wire_id)?;
        self.containers.get(*index).map(|container| container.as_ref())
    }

    pub fn states<R: StateRecord>(&self) -> Result<Vec<R>, StateError> {
        Ok(self.state_container::<R>()?.states())
    }

    pub fn iter<R: StateRecord>(&self) -> Result<StateIter<'_, R>, StateError> {
        Ok(self.state_container::<R>()?.iter())
    }

    pub fn state<R: StateRecord>(&self, key: StateKey) -> Result<&R, StateError> {
        self.state_container::<R>()?.get(key)
    }

    pub fn count<R: StateRecord>(&self) -> Result<usize, StateError> {
        Ok(self.state_container::<R>()?.count())
    }

    pub fn is_empty<R: StateRecord>(&self) -> Result<bool, StateError> {
        Ok(self.state_container::<R>()?.is_empty())
    }

    pub fn state_exists<R: StateRecord>(&self, key: StateKey) -> Result<bool, StateError> {
        Ok(self.state_container::<R>()?.key_exists(key))
    }

    pub fn next_available_key<R: StateRecord>(&self) -> Result<StateKey, StateError> {
        self.state_container::<R>()?.next_available_key()
    }

    // Writes

    pub fn add_state<R: StateRecord>(&mut self, record: R) -> Result<(), StateError> {
        self.state_container_mut::<R>()?.add_state(record)
    }

    /// Adds a default record of `kind`, at `key` or at the next available
    /// key. Returns the key used.
    pub fn add_state_of_kind(
        &mut self,
        kind: &StateKind,
        key: Option<StateKey>,
    ) -> Result<StateKey, StateError> {
        let index = *self
            .kind_to_index
            .get(kind)
            .ok_or(StateError::UnknownType { kind: kind.name() })?;
        let container = &mut self.containers[index];
        let key = match key {
            Some(key) => key,
            None => container.next_available_key()?,
        };
        container.add_default_state(key)?;
        Ok(key)
    }

    pub fn set_state<R: StateRecord>(&mut self, record: R) -> Result<(), StateError> {
        self.state_container_mut::<R>()?.set(record)
    }

    pub fn set_write_mode<R: StateRecord>(&mut self, write_mode: WriteMode) -> Result<(), StateError> {
        self.state_container_mut::<R>()?.set_write_mode(write_mode);
        Ok(())
    }

    // Flushing

    /// Flushes every container, whatever its flush mode
    pub fn flush(&mut self, transport: &mut dyn Transport, now: Instant) {
        let mut pipe = OutboundPipe::new(self.codec.as_ref(), transport);
        for container in self.containers.iter_mut() {
            container.flush(&mut pipe, now);
        }
    }

    pub fn flush_kind<R: StateRecord>(
        &mut self,
        transport: &mut dyn Transport,
        now: Instant,
    ) -> Result<(), StateError> {
        let index = self.index_of::<R>()?;
        let mut pipe = OutboundPipe::new(self.codec.as_ref(), transport);
        self.containers[index].flush(&mut pipe, now);
        Ok(())
    }

    pub fn flush_key<R: StateRecord>(
        &mut self,
        transport: &mut dyn Transport,
        key: StateKey,
        now: Instant,
    ) -> Result<(), StateError> {
        self.flush_keys::<R>(transport, &[key], now)
    }

    pub fn flush_keys<R: StateRecord>(
        &mut self,
        transport: &mut dyn Transport,
        keys: &[StateKey],
        now: Instant,
    ) -> Result<(), StateError> {
        let index = self.index_of::<R>()?;
        let mut pipe = OutboundPipe::new(self.codec.as_ref(), transport);
        self.containers[index].flush_keys(&mut pipe, keys, now);
        Ok(())
    }

    // Incoming

    pub fn receive_event(
        &mut self,
        transport: &mut dyn Transport,
        event: TransportEvent,
        now: Instant,
    ) {
        if self.status == SyncStatus::Terminated {
            debug!("StateSyncService terminated, ignoring transport event");
            return;
        }

        match event {
            TransportEvent::DeviceConnected { device, is_local } => {
                if is_local {
                    self.on_local_device_connected(transport);
                } else {
                    info!("Device {} connected", device);
                }
            }
            TransportEvent::DeviceDisconnected { device } => {
                if self.sync_tasks.remove(&device).is_some() {
                    info!("Device {} disconnected, abandoning its synchronization", device);
                }
            }
            TransportEvent::ReceiveData {
                wire_id,
                payload,
                sender,
            } => {
                if wire_id == SYNC_REQUEST_WIRE_ID {
                    self.on_sync_request(transport, sender, now);
                } else {
                    let from_server = transport
                        .device_role(sender)
                        .is_some_and(AppRole::serves_sync_requests);
                    self.on_receive_data(wire_id, &payload, from_server, now);
                }
            }
            TransportEvent::LocalSubscriptionModeChanged(mode) => {
                if !matches!(mode, SubscriptionMode::All | SubscriptionMode::Default) {
                    // sync requests must always reach us
                    transport.set_local_subscription(SYNC_REQUEST_WIRE_ID, true);
                }
            }
            TransportEvent::StatusChanged(status) => {
                self.connect_status = status;
                if status == ConnectStatus::Disconnected {
                    self.sync_tasks.clear();
                    self.awaiting_snapshots.clear();
                    self.initialized = false;
                    self.synchronized = false;
                    if self.status != SyncStatus::Uninitialized {
                        self.status = SyncStatus::AwaitingConnection;
                    }
                }
            }
        }
    }

    fn on_local_device_connected(&mut self, transport: &mut dyn Transport) {
        self.initialized = true;
        self.status = SyncStatus::Connected;

        if !transport.role().is_client() {
            self.synchronized = true;
            self.status = SyncStatus::Synchronized;
            return;
        }

        info!("Sending sync request");
        let request = SendDataArgs::skip_sender(
            SYNC_REQUEST_WIRE_ID,
            Vec::new().into_boxed_slice(),
            DeliveryMode::Reliable,
        );
        if let Err(err) = transport.send_data(request) {
            warn!("Failed to send sync request: {}", err);
            return;
        }

        self.synchronized = true;
        let local_device = transport.local_device_id();
        self.awaiting_snapshots = self
            .containers
            .iter()
            .map(|container| container.wire_id())
            .filter(|wire_id| transport.is_device_subscribed(local_device, *wire_id))
            .collect();
        self.status = if self.awaiting_snapshots.is_empty() {
            SyncStatus::Synchronized
        } else {
            SyncStatus::Synchronizing
        };
    }

    fn on_sync_request(&mut self, transport: &mut dyn Transport, device: DeviceId, now: Instant) {
        if !transport.role().serves_sync_requests() {
            debug!("Ignoring sync request from device {}, clients do not serve them", device);
            return;
        }
        if self.sync_tasks.contains_key(&device) {
            error!(
                "Device {} has already requested synchronization. Not proceeding.",
                device
            );
            return;
        }

        info!("Received sync request from device {}", device);
        let mut task = HandshakeTask::new(device, now);
        task.advance(
            &self.containers,
            self.codec.as_ref(),
            transport,
            self.config.device_sync_delay,
            now,
        );
        self.sync_tasks.insert(device, task);
    }

    fn on_receive_data(
        &mut self,
        wire_id: WireId,
        payload: &[u8],
        from_server: bool,
        now: Instant,
    ) {
        let Some(index) = self.wire_to_index.get(&wire_id).copied() else {
            return;
        };

        let container = &mut self.containers[index];
        match container.receive_flushed_payload(self.codec.as_ref(), payload, now) {
            Ok(keys) => {
                self.events.push_received(container.kind(), keys);
            }
            Err(err) => {
                warn!(
                    "Dropping {} payload on wire id {}: {}",
                    container.kind(),
                    wire_id,
                    err
                );
                return;
            }
        }

        // only a snapshot from a device serving sync requests counts
        if from_server
            && self.awaiting_snapshots.remove(&wire_id)
            && self.awaiting_snapshots.is_empty()
            && self.status == SyncStatus::Synchronizing
        {
            info!("Received every subscribed state type, synchronized");
            self.status = SyncStatus::Synchronized;
        }
    }

    /// Bulk loads a full snapshot into the container for `wire_id`,
    /// bypassing change tracking. Only clients accept snapshots this way.
    /// Returns the number of records loaded.
    pub fn receive_synchronized_states(
        &mut self,
        transport: &dyn Transport,
        wire_id: WireId,
        payload: &[u8],
    ) -> usize {
        if !transport.role().is_client() {
            error!("Only clients can receive synchronized states");
            return 0;
        }
        let Some(index) = self.wire_to_index.get(&wire_id).copied() else {
            error!("No state type registered for wire id {}", wire_id);
            return 0;
        };

        match self.containers[index].receive_synchronized_payload(self.codec.as_ref(), payload) {
            Ok(loaded) => loaded,
            Err(err) => {
                error!("Failed to load synchronized states on wire id {}: {}", wire_id, err);
                0
            }
        }
    }

    // Tick

    /// Advances in-flight handshakes, clears finished ones, then flushes
    /// every container whose cadence is due
    pub fn update(&mut self, transport: &mut dyn Transport, now: Instant) {
        if self.status == SyncStatus::Terminated {
            return;
        }

        self.advance_sync_tasks(transport, now);
        self.sweep_sync_tasks();
        self.flush_due(transport, now);
    }

    fn advance_sync_tasks(&mut self, transport: &mut dyn Transport, now: Instant) {
        for task in self.sync_tasks.values_mut() {
            task.advance(
                &self.containers,
                self.codec.as_ref(),
                transport,
                self.config.device_sync_delay,
                now,
            );
        }
    }

    fn sweep_sync_tasks(&mut self) {
        let finished: Vec<DeviceId> = self
            .sync_tasks
            .iter()
            .filter(|(_, task)| task.is_finished())
            .map(|(device, _)| *device)
            .collect();

        for device in finished {
            let Some(task) = self.sync_tasks.remove(&device) else {
                continue;
            };
            match task.into_outcome() {
                Some(Ok(())) => {
                    info!("Finished synchronizing device {}", device);
                    self.events.push_handshake_completed(device);
                }
                Some(Err(fault)) => {
                    error!(
                        "Error in synchronization request task for device {}: {}",
                        device, fault
                    );
                    self.events.push_handshake_fault(device, fault);
                }
                None => {}
            }
        }
    }

    fn flush_due(&mut self, transport: &mut dyn Transport, now: Instant) {
        let mut pipe = OutboundPipe::new(self.codec.as_ref(), transport);
        for container in self.containers.iter_mut() {
            if !container.has_pending() {
                continue;
            }
            let due = match container.flush_mode() {
                FlushMode::Automatic => true,
                FlushMode::Interval => match container.last_flush_attempt() {
                    Some(last) => {
                        now.saturating_duration_since(last) >= container.config().flush_interval
                    }
                    None => true,
                },
                FlushMode::Manual => false,
            };
            if due {
                container.flush(&mut pipe, now);
            }
        }
    }

    /// Stops handling transport events and drops in-flight handshakes.
    /// Containers and their states remain readable.
    pub fn teardown(&mut self) {
        self.sync_tasks.clear();
        self.status = SyncStatus::Terminated;
        info!("StateSyncService torn down");
    }

    // Events

    pub fn take_events(&mut self) -> StateEvents {
        for container in self.containers.iter_mut() {
            self.events.push_changes(container.take_changes());
        }
        std::mem::replace(&mut self.events, StateEvents::new())
    }

    fn index_of<R: StateRecord>(&self) -> Result<usize, StateError> {
        let kind = StateKind::of::<R>();
        self.kind_to_index
            .get(&kind)
            .copied()
            .ok_or(StateError::UnknownType { kind: kind.name() })
    }
}
