use thiserror::Error;

use crate::types::StateKey;

/// Errors that can occur during state container operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// A record with the same key already exists in the container
    #[error("Collision with existing key {key} in {kind} states. Use `next_available_key()` to find a free key")]
    DuplicateKey {
        kind: &'static str,
        key: StateKey,
    },

    /// No record exists for the key
    #[error("Couldn't find key {key} in {kind} states")]
    KeyNotFound {
        kind: &'static str,
        key: StateKey,
    },

    /// The key lies outside `0..MAX_STATE_KEY`, or no free key remains
    #[error("Key {key} in {kind} states is out of range. Keys must be between 0 and {max}")]
    IndexOutOfRange {
        kind: &'static str,
        key: StateKey,
        max: StateKey,
    },

    /// The record type was never registered with the service
    #[error("No state container registered for {kind}. Must call `add_state()` on the StateProtocol before initialization")]
    UnknownType {
        kind: &'static str,
    },
}
