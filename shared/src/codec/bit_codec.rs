use naia_serde::{BitReader, FileBitWriter, Serde, UnsignedVariableInteger};

use crate::{
    codec::{CodecError, StateBatch, StateBatchSink, StateCodec},
    types::MAX_STATE_KEY,
};

/// Upper bound on records per payload: one per possible key
const MAX_BATCH_LEN: usize = MAX_STATE_KEY as usize;

/// Plain naia-serde bit stream: a variable length record count followed
/// by each record's own encoding
#[derive(Clone, Copy, Debug, Default)]
pub struct BitCodec;

impl StateCodec for BitCodec {
    fn validate(&self) -> Result<(), CodecError> {
        Ok(())
    }

    fn encode(&self, batch: &dyn StateBatch) -> Result<Box<[u8]>, CodecError> {
        let count = batch.len();
        if count > MAX_BATCH_LEN {
            return Err(CodecError::BatchTooLarge {
                count,
                max: MAX_BATCH_LEN,
            });
        }

        let mut writer = FileBitWriter::new();
        UnsignedVariableInteger::<7>::new(count as u64).ser(&mut writer);
        batch.write(&mut writer);
        Ok(writer.to_bytes())
    }

    fn decode(&self, payload: &[u8], sink: &mut dyn StateBatchSink) -> Result<(), CodecError> {
        let mut reader = BitReader::new(payload);
        let count = UnsignedVariableInteger::<7>::de(&mut reader)?.get();
        let count = usize::try_from(count).map_err(|_| CodecError::Malformed)?;
        if count > MAX_BATCH_LEN {
            return Err(CodecError::BatchTooLarge {
                count,
                max: MAX_BATCH_LEN,
            });
        }

        for _ in 0..count {
            sink.read_one(&mut reader)?;
        }
        Ok(())
    }
}
