use std::{any::Any, time::Instant};

use crate::{
    codec::{CodecError, StateCodec},
    pipe::StatePipe,
    state::{
        FlushMode, StateChange, StateConfig, StateContainer, StateError, StateKind, StateRecord,
        WriteMode,
    },
    types::{DeliveryMode, StateKey, WireId},
};

/// Uniform, type-erased view of a `StateContainer<R>`, used wherever
/// containers are addressed by kind or wire id instead of by type.
pub trait StateContainerBase: Send + Sync {
    fn kind(&self) -> StateKind;
    fn config(&self) -> &StateConfig;

    fn wire_id(&self) -> WireId {
        self.config().wire_id
    }

    fn delivery_mode(&self) -> DeliveryMode {
        self.config().delivery_mode
    }

    fn flush_mode(&self) -> FlushMode {
        self.config().flush_mode
    }

    fn write_mode(&self) -> WriteMode;
    fn set_write_mode(&mut self, write_mode: WriteMode);

    fn count(&self) -> usize;
    fn is_empty(&self) -> bool;
    fn has_pending(&self) -> bool;
    fn key_exists(&self, key: StateKey) -> bool;
    fn next_available_key(&self) -> Result<StateKey, StateError>;
    fn last_flush_attempt(&self) -> Option<Instant>;

    /// Adds a default record for `key`
    fn add_default_state(&mut self, key: StateKey) -> Result<(), StateError>;

    fn flush(&mut self, pipe: &mut dyn StatePipe, now: Instant);
    fn flush_key(&mut self, pipe: &mut dyn StatePipe, key: StateKey, now: Instant);
    fn flush_keys(&mut self, pipe: &mut dyn StatePipe, keys: &[StateKey], now: Instant);

    /// Encodes every record as a full snapshot
    fn encode_snapshot(&self, codec: &dyn StateCodec) -> Result<Box<[u8]>, CodecError>;

    /// Decodes and applies flushed records. Returns every decoded key.
    fn receive_flushed_payload(
        &mut self,
        codec: &dyn StateCodec,
        payload: &[u8],
        now: Instant,
    ) -> Result<Vec<StateKey>, CodecError>;

    /// Decodes and bulk loads a full snapshot. Returns the number of
    /// records loaded.
    fn receive_synchronized_payload(
        &mut self,
        codec: &dyn StateCodec,
        payload: &[u8],
    ) -> Result<usize, CodecError>;

    fn take_changes(&mut self) -> Vec<StateChange>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<R: StateRecord> StateContainerBase for StateContainer<R> {
    fn kind(&self) -> StateKind {
        StateContainer::kind(self)
    }

    fn config(&self) -> &StateConfig {
        StateContainer::config(self)
    }

    fn write_mode(&self) -> WriteMode {
        StateContainer::write_mode(self)
    }

    fn set_write_mode(&mut self, write_mode: WriteMode) {
        StateContainer::set_write_mode(self, write_mode);
    }

    fn count(&self) -> usize {
        StateContainer::count(self)
    }

    fn is_empty(&self) -> bool {
        StateContainer::is_empty(self)
    }

    fn has_pending(&self) -> bool {
        StateContainer::has_pending(self)
    }

    fn key_exists(&self, key: StateKey) -> bool {
        StateContainer::key_exists(self, key)
    }

    fn next_available_key(&self) -> Result<StateKey, StateError> {
        StateContainer::next_available_key(self)
    }

    fn last_flush_attempt(&self) -> Option<Instant> {
        StateContainer::last_flush_attempt(self)
    }

    fn add_default_state(&mut self, key: StateKey) -> Result<(), StateError> {
        self.add_state(R::with_key(key))
    }

    fn flush(&mut self, pipe: &mut dyn StatePipe, now: Instant) {
        StateContainer::flush(self, pipe, now);
    }

    fn flush_key(&mut self, pipe: &mut dyn StatePipe, key: StateKey, now: Instant) {
        StateContainer::flush_key(self, pipe, key, now);
    }

    fn flush_keys(&mut self, pipe: &mut dyn StatePipe, keys: &[StateKey], now: Instant) {
        StateContainer::flush_keys(self, pipe, keys, now);
    }

    fn encode_snapshot(&self, codec: &dyn StateCodec) -> Result<Box<[u8]>, CodecError> {
        codec.encode(&self.states())
    }

    fn receive_flushed_payload(
        &mut self,
        codec: &dyn StateCodec,
        payload: &[u8],
        now: Instant,
    ) -> Result<Vec<StateKey>, CodecError> {
        let mut records: Vec<R> = Vec::new();
        codec.decode(payload, &mut records)?;
        let keys = records.iter().map(|record| record.key()).collect();
        self.receive_flushed_states(records, now);
        Ok(keys)
    }

    fn receive_synchronized_payload(
        &mut self,
        codec: &dyn StateCodec,
        payload: &[u8],
    ) -> Result<usize, CodecError> {
        let mut records: Vec<R> = Vec::new();
        codec.decode(payload, &mut records)?;
        Ok(self.receive_synchronized_states(records))
    }

    fn take_changes(&mut self) -> Vec<StateChange> {
        StateContainer::take_changes(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
