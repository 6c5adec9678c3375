use naia_serde::SerdeErr;
use thiserror::Error;

/// Errors that can occur while encoding or decoding state payloads
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The payload bit stream could not be read back into records
    #[error("Malformed state payload. The bit stream ended early or holds invalid data")]
    Malformed,

    /// The record count prefix exceeds what any container can hold
    #[error("State payload declares {count} records, more than the maximum of {max}")]
    BatchTooLarge {
        count: usize,
        max: usize,
    },

    /// Compressing or decompressing the payload failed
    #[error("State payload compression failed: {reason}")]
    Compression {
        reason: String,
    },

    /// The codec settings are unusable
    #[error("Unsupported codec configuration: {reason}")]
    Unsupported {
        reason: String,
    },
}

impl From<SerdeErr> for CodecError {
    fn from(_: SerdeErr) -> Self {
        CodecError::Malformed
    }
}
