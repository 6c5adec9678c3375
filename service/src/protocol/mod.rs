mod state_generator;
mod state_kinds;

pub use state_generator::StateGenerator;
pub use state_kinds::{StateKinds, StateRegistration};

use statesync_shared::StateRecord;

/// Declares which record types a service synchronizes
#[derive(Default)]
pub struct StateProtocol {
    pub state_kinds: StateKinds,
    pub generators: Vec<Box<dyn StateGenerator>>,
}

impl StateProtocol {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn add_state<R: StateRecord>(&mut self) -> &mut Self {
        self.state_kinds.add_state::<R>();
        self
    }

    /// Generators contribute their own state types, registered after the
    /// types added directly, and seed required records at initialization
    pub fn add_generator<G: StateGenerator + 'static>(&mut self, generator: G) -> &mut Self {
        self.generators.push(Box::new(generator));
        self
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }
}
