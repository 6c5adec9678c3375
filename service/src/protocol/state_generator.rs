use statesync_shared::StateError;

use crate::{protocol::StateKinds, StateSyncService};

/// Pluggable source of state types and the records a session needs
/// before any device connects
pub trait StateGenerator {
    fn name(&self) -> &str;

    fn state_kinds(&self) -> StateKinds;

    /// Runs once during initialization, after every container exists
    fn generate_required_states(&self, service: &mut StateSyncService) -> Result<(), StateError>;
}
