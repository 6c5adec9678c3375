use statesync_shared::DeviceId;

/// What the host has learned about one device's clock
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceTimeStatus {
    pub device: DeviceId,
    pub active: bool,
    /// Averaged one-way latency, in seconds
    pub latency: f32,
    /// Set once enough latency checks have completed
    pub synchronized: bool,
}

impl DeviceTimeStatus {
    pub fn new(device: DeviceId) -> Self {
        Self {
            device,
            active: true,
            latency: 0.0,
            synchronized: false,
        }
    }
}
