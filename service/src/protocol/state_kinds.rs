use statesync_shared::{
    StateConfig, StateContainer, StateContainerBase, StateKind, StateRecord,
};

use crate::ConfigurationError;

type BuildContainer = fn() -> Option<Box<dyn StateContainerBase>>;

fn build_container<R: StateRecord>() -> Option<Box<dyn StateContainerBase>> {
    let config: StateConfig = R::config()?;
    Some(Box::new(StateContainer::<R>::new(config)))
}

/// A record type and the means to build its container
#[derive(Clone, Copy)]
pub struct StateRegistration {
    kind: StateKind,
    build: BuildContainer,
}

impl StateRegistration {
    pub fn of<R: StateRecord>() -> Self {
        Self {
            kind: StateKind::of::<R>(),
            build: build_container::<R>,
        }
    }

    pub fn kind(&self) -> StateKind {
        self.kind
    }

    pub(crate) fn build(&self) -> Result<Box<dyn StateContainerBase>, ConfigurationError> {
        (self.build)().ok_or(ConfigurationError::MissingConfig {
            kind: self.kind.name(),
        })
    }
}

/// Ordered list of registered record types. Duplicates are kept here and
/// filtered out when the service initializes.
#[derive(Clone, Default)]
pub struct StateKinds {
    registrations: Vec<StateRegistration>,
}

impl StateKinds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_state<R: StateRecord>(&mut self) -> &mut Self {
        self.registrations.push(StateRegistration::of::<R>());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &StateRegistration> {
        self.registrations.iter()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
