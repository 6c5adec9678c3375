use log::{debug, warn};

use statesync_shared::{
    DeliveryMode, SendDataArgs, StateBatch, StateCodec, StatePipe, Transport, WireId,
};

/// Encodes flushed batches and hands them to the transport
pub(crate) struct OutboundPipe<'a> {
    codec: &'a dyn StateCodec,
    transport: &'a mut dyn Transport,
}

impl<'a> OutboundPipe<'a> {
    pub fn new(codec: &'a dyn StateCodec, transport: &'a mut dyn Transport) -> Self {
        Self { codec, transport }
    }
}

impl StatePipe for OutboundPipe<'_> {
    fn send_flushed_states(
        &mut self,
        wire_id: WireId,
        delivery_mode: DeliveryMode,
        flushed: &dyn StateBatch,
    ) {
        if !self.transport.status().is_connected() {
            debug!(
                "Not connected, skipping send of {} flushed states on wire id {}",
                flushed.len(),
                wire_id
            );
            return;
        }

        let payload = match self.codec.encode(flushed) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("Failed to encode flushed states for wire id {}: {}", wire_id, err);
                return;
            }
        };

        if let Err(err) = self
            .transport
            .send_data(SendDataArgs::skip_sender(wire_id, payload, delivery_mode))
        {
            warn!("Failed to send flushed states for wire id {}: {}", wire_id, err);
        }
    }
}
