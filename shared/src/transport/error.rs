use thiserror::Error;

use crate::types::DeviceId;

/// Errors that can occur when handing data to a transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The local device is not connected
    #[error("Transport is not connected. Data can only be sent once the local device has connected")]
    NotConnected,

    /// A manual send target is not connected to the session
    #[error("Device {device} is not connected to the session")]
    UnknownDevice {
        device: DeviceId,
    },

    /// The underlying connection rejected the data
    #[error("Transport failed to send data: {reason}")]
    SendFailed {
        reason: String,
    },
}
