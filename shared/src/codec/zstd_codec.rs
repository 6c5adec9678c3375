use zstd::bulk::Decompressor;

use crate::codec::{BitCodec, CodecError, StateBatch, StateBatchSink, StateCodec};

/// Largest payload a `ZstdCodec` inflates unless configured otherwise
pub const DEFAULT_MAX_DECOMPRESSED_SIZE: usize = 1 << 20;

/// `BitCodec` output compressed with zstd
#[derive(Clone, Copy, Debug)]
pub struct ZstdCodec {
    level: i32,
    max_decompressed_size: usize,
    inner: BitCodec,
}

impl ZstdCodec {
    pub fn new(level: i32) -> Self {
        Self {
            level,
            max_decompressed_size: DEFAULT_MAX_DECOMPRESSED_SIZE,
            inner: BitCodec,
        }
    }

    /// Caps how many bytes a single received payload may inflate to
    pub fn with_max_decompressed_size(mut self, max_decompressed_size: usize) -> Self {
        self.max_decompressed_size = max_decompressed_size;
        self
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn max_decompressed_size(&self) -> usize {
        self.max_decompressed_size
    }
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self::new(zstd::DEFAULT_COMPRESSION_LEVEL)
    }
}

impl StateCodec for ZstdCodec {
    fn validate(&self) -> Result<(), CodecError> {
        let range = zstd::compression_level_range();
        if !range.contains(&self.level) {
            return Err(CodecError::Unsupported {
                reason: format!(
                    "zstd compression level {} outside {}..={}",
                    self.level,
                    range.start(),
                    range.end()
                ),
            });
        }
        if self.max_decompressed_size == 0 {
            return Err(CodecError::Unsupported {
                reason: "zstd decompressed size limit must be positive".to_string(),
            });
        }
        Ok(())
    }

    fn encode(&self, batch: &dyn StateBatch) -> Result<Box<[u8]>, CodecError> {
        let raw = self.inner.encode(batch)?;
        if raw.len() > self.max_decompressed_size {
            return Err(CodecError::Compression {
                reason: format!(
                    "{} byte batch exceeds the {} byte limit",
                    raw.len(),
                    self.max_decompressed_size
                ),
            });
        }
        let compressed = zstd::encode_all(&raw[..], self.level).map_err(|err| {
            CodecError::Compression {
                reason: err.to_string(),
            }
        })?;
        Ok(compressed.into_boxed_slice())
    }

    fn decode(&self, payload: &[u8], sink: &mut dyn StateBatchSink) -> Result<(), CodecError> {
        let mut decompressor = Decompressor::new().map_err(|err| CodecError::Compression {
            reason: err.to_string(),
        })?;

        // Fails once the output would outgrow the limit
        let raw = decompressor
            .decompress(payload, self.max_decompressed_size)
            .map_err(|err| CodecError::Compression {
                reason: format!(
                    "{} byte payload did not inflate within {} bytes: {}",
                    payload.len(),
                    self.max_decompressed_size,
                    err
                ),
            })?;
        self.inner.decode(&raw, sink)
    }
}
