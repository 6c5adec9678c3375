use std::time::{Duration, Instant};

use thiserror::Error;

use statesync_shared::{
    CodecError, DeviceId, SendDataArgs, StateCodec, StateContainerBase, Transport,
    TransportError, WireId,
};

/// Reasons a full-sync handshake is abandoned
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeFault {
    /// A container snapshot could not be encoded
    #[error("Failed to encode {kind} snapshot for device {device}: {source}")]
    Encode {
        device: DeviceId,
        kind: &'static str,
        source: CodecError,
    },

    /// The transport refused a container snapshot
    #[error("Failed to send {kind} snapshot to device {device}: {source}")]
    Send {
        device: DeviceId,
        kind: &'static str,
        source: TransportError,
    },
}

enum TaskState {
    Running,
    Completed,
    Faulted(HandshakeFault),
}

/// Sends every container's snapshot to one device, one container per
/// pacing interval, in registration order
pub(crate) struct HandshakeTask {
    device: DeviceId,
    next_container: usize,
    next_send_at: Instant,
    sent: Vec<WireId>,
    state: TaskState,
}

impl HandshakeTask {
    pub fn new(device: DeviceId, now: Instant) -> Self {
        Self {
            device,
            next_container: 0,
            next_send_at: now,
            sent: Vec::new(),
            state: TaskState::Running,
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self.state, TaskState::Running)
    }

    pub fn sent(&self) -> &[WireId] {
        &self.sent
    }

    /// Sends the next snapshot the device subscribes to, if the pacing
    /// deadline has passed. Completes once no subscribed container is left.
    pub fn advance(
        &mut self,
        containers: &[Box<dyn StateContainerBase>],
        codec: &dyn StateCodec,
        transport: &mut dyn Transport,
        pacing: Duration,
        now: Instant,
    ) {
        if self.is_finished() || now < self.next_send_at {
            return;
        }

        while let Some(container) = containers.get(self.next_container) {
            if transport.is_device_subscribed(self.device, container.wire_id()) {
                break;
            }
            self.next_container += 1;
        }

        let Some(container) = containers.get(self.next_container) else {
            self.state = TaskState::Completed;
            return;
        };
        self.next_container += 1;

        match self.send_snapshot(container.as_ref(), codec, transport) {
            Ok(()) => {
                self.sent.push(container.wire_id());
                self.next_send_at = now + pacing;
            }
            Err(fault) => {
                self.state = TaskState::Faulted(fault);
            }
        }
    }

    fn send_snapshot(
        &self,
        container: &dyn StateContainerBase,
        codec: &dyn StateCodec,
        transport: &mut dyn Transport,
    ) -> Result<(), HandshakeFault> {
        let kind = container.kind().name();
        let payload = container
            .encode_snapshot(codec)
            .map_err(|source| HandshakeFault::Encode {
                device: self.device,
                kind,
                source,
            })?;

        transport
            .send_data(SendDataArgs::targeted(
                container.wire_id(),
                payload,
                container.delivery_mode(),
                vec![self.device],
            ))
            .map_err(|source| HandshakeFault::Send {
                device: self.device,
                kind,
                source,
            })
    }

    /// `None` while still running
    pub fn into_outcome(self) -> Option<Result<(), HandshakeFault>> {
        match self.state {
            TaskState::Running => None,
            TaskState::Completed => Some(Ok(())),
            TaskState::Faulted(fault) => Some(Err(fault)),
        }
    }
}
