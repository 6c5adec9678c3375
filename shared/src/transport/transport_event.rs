use crate::types::{ConnectStatus, DeviceId, SubscriptionMode, WireId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    DeviceConnected { device: DeviceId, is_local: bool },
    DeviceDisconnected { device: DeviceId },
    ReceiveData {
        wire_id: WireId,
        payload: Box<[u8]>,
        sender: DeviceId,
    },
    LocalSubscriptionModeChanged(SubscriptionMode),
    StatusChanged(ConnectStatus),
}
