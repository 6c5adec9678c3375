//! # Statesync Shared
//! Typed state containers, payload codecs and the transport contract
//! shared by the statesync services.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

#[macro_use]
extern crate cfg_if;

pub use naia_serde::{
    BitReader, BitWrite, FileBitWriter, Serde, SerdeErr, UnsignedVariableInteger,
};

mod codec;
mod pipe;
pub mod quantize;
mod state;
mod transport;
mod types;

pub use codec::{
    from_payload, to_payload, BitCodec, CodecError, StateBatch, StateBatchSink, StateCodec,
};
pub use pipe::{RecordedFlush, RecordingPipe, StatePipe};
pub use state::{
    ChangeOrigin, FlushMode, StateChange, StateConfig, StateContainer, StateContainerBase,
    StateError, StateIter, StateKind, StateRecord, WriteMode,
};
pub use transport::{SendDataArgs, Transport, TransportError, TransportEvent};
pub use types::{
    is_valid_key, AppRole, ConnectStatus, DeliveryMode, DeviceId, SendMode, StateKey,
    SubscriptionMode, WireId, MAX_STATE_KEY, SYNC_REQUEST_WIRE_ID,
};

cfg_if! {
    if #[cfg(feature = "zstd_support")] {
        pub use codec::{ZstdCodec, DEFAULT_MAX_DECOMPRESSED_SIZE};
    }
}
