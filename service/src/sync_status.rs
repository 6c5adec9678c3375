#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SyncStatus {
    #[default]
    Uninitialized,
    Initializing,
    AwaitingConnection,
    /// Connected, sync request not yet sent
    Connected,
    /// Waiting for a first payload of every subscribed state type
    Synchronizing,
    Synchronized,
    Terminated,
}
