use crate::{
    codec::StateBatch,
    types::{DeliveryMode, StateKey, WireId},
};

/// Outbound sink for flushed records
pub trait StatePipe {
    fn send_flushed_states(
        &mut self,
        wire_id: WireId,
        delivery_mode: DeliveryMode,
        flushed: &dyn StateBatch,
    );
}

/// One batch captured by a `RecordingPipe`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedFlush {
    pub wire_id: WireId,
    pub delivery_mode: DeliveryMode,
    pub keys: Vec<StateKey>,
}

/// Captures flushed batches instead of sending them, for playback
/// recordings and inspection
#[derive(Default)]
pub struct RecordingPipe {
    flushes: Vec<RecordedFlush>,
}

impl RecordingPipe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flushes(&self) -> &[RecordedFlush] {
        &self.flushes
    }

    pub fn take_flushes(&mut self) -> Vec<RecordedFlush> {
        std::mem::take(&mut self.flushes)
    }
}

impl StatePipe for RecordingPipe {
    fn send_flushed_states(
        &mut self,
        wire_id: WireId,
        delivery_mode: DeliveryMode,
        flushed: &dyn StateBatch,
    ) {
        self.flushes.push(RecordedFlush {
            wire_id,
            delivery_mode,
            keys: flushed.keys(),
        });
    }
}
