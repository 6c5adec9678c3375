use crate::{state::StateKind, types::StateKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeOrigin {
    /// A local write through `set`
    External,
    /// A flushed or merged value applied by the container itself
    Internal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StateChange {
    pub kind: StateKind,
    pub key: StateKey,
    pub origin: ChangeOrigin,
}
