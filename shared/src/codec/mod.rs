mod bit_codec;
mod error;
mod state_batch;

cfg_if! {
    if #[cfg(feature = "zstd_support")] {
        mod zstd_codec;
        pub use zstd_codec::{ZstdCodec, DEFAULT_MAX_DECOMPRESSED_SIZE};
    }
}

pub use bit_codec::BitCodec;
pub use error::CodecError;
pub use state_batch::{StateBatch, StateBatchSink};

use naia_serde::{BitReader, FileBitWriter, Serde};

/// Turns record batches into transport payloads and back
pub trait StateCodec: Send + Sync {
    /// Checks the codec settings before any payload is produced
    fn validate(&self) -> Result<(), CodecError>;

    fn encode(&self, batch: &dyn StateBatch) -> Result<Box<[u8]>, CodecError>;

    fn decode(&self, payload: &[u8], sink: &mut dyn StateBatchSink) -> Result<(), CodecError>;
}

/// Serializes a single value into a standalone payload
pub fn to_payload<T: Serde>(value: &T) -> Box<[u8]> {
    let mut writer = FileBitWriter::new();
    value.ser(&mut writer);
    writer.to_bytes()
}

pub fn from_payload<T: Serde>(payload: &[u8]) -> Result<T, CodecError> {
    let mut reader = BitReader::new(payload);
    Ok(T::de(&mut reader)?)
}
