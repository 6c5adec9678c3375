use std::fmt::Debug;

use naia_serde::Serde;

use crate::{state::StateConfig, types::StateKey};

/// A small, fixed-shape value addressed by a `StateKey`.
///
/// Byte encoding comes from `Serde`; everything the containers need to
/// track, compare and reconcile records comes from this trait.
pub trait StateRecord: Serde + Clone + Debug + Send + Sync + 'static {
    /// Synchronization settings for this record type. Returning `None`
    /// makes registration of the type fail.
    fn config() -> Option<StateConfig>;

    /// A default record for `key`
    fn with_key(key: StateKey) -> Self;

    fn key(&self) -> StateKey;

    /// True if `other` differs in a way that requires re-sync
    fn is_different(&self, other: &Self) -> bool;

    /// Reconciles a local pending edit with a remote value for the same key
    fn merge(local: &Self, remote: &Self) -> Self;
}
