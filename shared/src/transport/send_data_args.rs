use crate::types::{DeliveryMode, DeviceId, SendMode, WireId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendDataArgs {
    pub wire_id: WireId,
    pub payload: Box<[u8]>,
    pub delivery_mode: DeliveryMode,
    pub send_mode: SendMode,
    /// Only read for `SendMode::ManualTargets`
    pub targets: Vec<DeviceId>,
}

impl SendDataArgs {
    /// Sends to every connected device except this one
    pub fn skip_sender(wire_id: WireId, payload: Box<[u8]>, delivery_mode: DeliveryMode) -> Self {
        Self {
            wire_id,
            payload,
            delivery_mode,
            send_mode: SendMode::SkipSender,
            targets: Vec::new(),
        }
    }

    pub fn targeted(
        wire_id: WireId,
        payload: Box<[u8]>,
        delivery_mode: DeliveryMode,
        targets: Vec<DeviceId>,
    ) -> Self {
        Self {
            wire_id,
            payload,
            delivery_mode,
            send_mode: SendMode::ManualTargets,
            targets,
        }
    }
}
