use naia_serde::{BitReader, BitWrite, Serde, SerdeErr};

use statesync_shared::DeviceId;

// f32 fields travel as their IEEE 754 bits

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct LatencyCheck {
    pub time_request_sent: f32,
}

impl Serde for LatencyCheck {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.time_request_sent.to_bits().ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            time_request_sent: f32::from_bits(u32::de(reader)?),
        })
    }

    fn bit_length(&self) -> u32 {
        self.time_request_sent.to_bits().bit_length()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct LatencyUpdate {
    pub device: DeviceId,
    pub latency: f32,
    pub synchronized: bool,
}

impl Serde for LatencyUpdate {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.device.ser(writer);
        self.latency.to_bits().ser(writer);
        self.synchronized.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            device: DeviceId::de(reader)?,
            latency: f32::from_bits(u32::de(reader)?),
            synchronized: bool::de(reader)?,
        })
    }

    fn bit_length(&self) -> u32 {
        self.device.bit_length() + self.latency.to_bits().bit_length() + self.synchronized.bit_length()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TargetTime {
    pub target_time: f32,
}

impl Serde for TargetTime {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.target_time.to_bits().ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            target_time: f32::from_bits(u32::de(reader)?),
        })
    }

    fn bit_length(&self) -> u32 {
        self.target_time.to_bits().bit_length()
    }
}
