use thiserror::Error;

use statesync_shared::{CodecError, WireId};

/// Errors that can occur while registering state types or initializing
/// the service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The record type already has a container
    #[error("State type {kind} is already registered. Each type may only be added once")]
    AlreadyRegistered {
        kind: &'static str,
    },

    /// The record type provides no `StateConfig`
    #[error("State type {kind} has no StateConfig. `StateRecord::config()` must return Some")]
    MissingConfig {
        kind: &'static str,
    },

    /// The record type is configured with the wire id reserved for sync requests
    #[error("State type {kind} uses wire id {wire_id}, which is reserved for sync requests")]
    ReservedWireId {
        kind: &'static str,
        wire_id: WireId,
    },

    /// Another registered type already uses the wire id
    #[error("State type {kind} uses wire id {wire_id}, already taken by {existing}")]
    WireIdCollision {
        kind: &'static str,
        wire_id: WireId,
        existing: &'static str,
    },

    /// The codec rejected its own settings
    #[error("State codec failed validation: {source}")]
    InvalidCodec {
        #[from]
        source: CodecError,
    },

    /// `initialize()` was called more than once
    #[error("StateSyncService has already been initialized")]
    AlreadyInitialized,
}
