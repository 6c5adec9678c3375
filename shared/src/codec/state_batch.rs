use naia_serde::{BitReader, BitWrite, SerdeErr};

use crate::{state::StateRecord, types::StateKey};

/// Object-safe view over a typed batch of records, so codecs can frame
/// payloads without knowing the record type
pub trait StateBatch {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn keys(&self) -> Vec<StateKey>;

    /// Writes every record, in order, without any framing
    fn write(&self, writer: &mut dyn BitWrite);
}

/// Receives records one at a time while a payload is decoded
pub trait StateBatchSink {
    fn read_one(&mut self, reader: &mut BitReader) -> Result<(), SerdeErr>;
}

impl<R: StateRecord> StateBatch for Vec<R> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn keys(&self) -> Vec<StateKey> {
        self.iter().map(|record| record.key()).collect()
    }

    fn write(&self, writer: &mut dyn BitWrite) {
        for record in self {
            record.ser(writer);
        }
    }
}

impl<R: StateRecord> StateBatchSink for Vec<R> {
    fn read_one(&mut self, reader: &mut BitReader) -> Result<(), SerdeErr> {
        self.push(R::de(reader)?);
        Ok(())
    }
}
