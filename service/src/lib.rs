//! # Statesync Service
//! Keeps typed state containers consistent across every device in a
//! session, plus a companion service sharing a session clock.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

#[macro_use]
extern crate cfg_if;

pub use statesync_shared::{
    AppRole, BitCodec, ChangeOrigin, CodecError, ConnectStatus, DeliveryMode, DeviceId, FlushMode,
    SendDataArgs, SendMode, StateChange, StateCodec, StateConfig, StateContainer,
    StateContainerBase, StateError, StateKey, StateKind, StateRecord, SubscriptionMode, Transport,
    TransportError, TransportEvent, WireId, WriteMode, SYNC_REQUEST_WIRE_ID,
};

mod config;
mod error;
mod events;
mod handshake;
mod outbound_pipe;
mod protocol;
mod state_sync_service;
mod sync_status;
mod time_sync;

pub use config::StateSyncConfig;
pub use error::ConfigurationError;
pub use events::{
    ExternalChangeEvent, HandshakeCompleteEvent, HandshakeFaultEvent, InternalChangeEvent,
    ReceiveStatesEvent, StateEvent, StateEvents,
};
pub use handshake::HandshakeFault;
pub use protocol::{StateGenerator, StateKinds, StateProtocol, StateRegistration};
pub use state_sync_service::StateSyncService;
pub use sync_status::SyncStatus;
pub use time_sync::{DeviceTimeStatus, TimeSyncConfig, TimeSyncService, TIME_SYNC_WIRE_ID};

cfg_if! {
    if #[cfg(feature = "zstd_support")] {
        pub use statesync_shared::ZstdCodec;
    }
}
