pub type StateKey = i16;
pub type WireId = i16;
pub type DeviceId = i16;

/// Keys must fall within `0..MAX_STATE_KEY`
pub const MAX_STATE_KEY: StateKey = i16::MAX;
/// Wire id reserved for the initial full-sync request
pub const SYNC_REQUEST_WIRE_ID: WireId = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AppRole {
    Host,
    Client,
    Peer,
}

impl AppRole {
    pub fn is_client(self) -> bool {
        matches!(self, AppRole::Client)
    }

    /// Hosts and peers answer full-sync requests, clients issue them
    pub fn serves_sync_requests(self) -> bool {
        !self.is_client()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DeliveryMode {
    Reliable,
    ReliableSequenced,
    Unreliable,
    UnreliableSequenced,
    #[default]
    UnreliableUnsequenced,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SendMode {
    /// Every connected device, the sender included
    #[default]
    Default,
    /// Every connected device except the sender
    SkipSender,
    /// Only the devices listed as targets
    ManualTargets,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SubscriptionMode {
    #[default]
    Default,
    All,
    Manual,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConnectStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectStatus {
    pub fn is_connected(self) -> bool {
        matches!(self, ConnectStatus::Connected)
    }
}

/// Returns true if `key` lies in the valid state key range
pub fn is_valid_key(key: StateKey) -> bool {
    (0..MAX_STATE_KEY).contains(&key)
}
