/// Controls whether local writes are accepted by a container
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WriteMode {
    #[default]
    Write,
    /// States are being replayed from a recording
    Playback,
    /// States are owned by a peer
    Locked,
}

impl WriteMode {
    pub fn accepts_writes(self) -> bool {
        matches!(self, WriteMode::Write)
    }
}
