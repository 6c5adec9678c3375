use std::{marker::PhantomData, mem, vec::IntoIter};

use statesync_shared::{ChangeOrigin, DeviceId, StateChange, StateKey, StateKind, StateRecord};

use crate::HandshakeFault;

pub struct StateEvents {
    changes: Vec<StateChange>,
    received: Vec<(StateKind, Vec<StateKey>)>,
    handshakes_completed: Vec<DeviceId>,
    handshake_faults: Vec<(DeviceId, HandshakeFault)>,

    empty: bool,
}

impl StateEvents {
    pub(crate) fn new() -> Self {
        Self {
            changes: Vec::new(),
            received: Vec::new(),
            handshakes_completed: Vec::new(),
            handshake_faults: Vec::new(),

            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: StateEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: StateEvent>(&self) -> bool {
        V::has(self)
    }

    // Exposed for consumers that handle every state type alike, such as
    // inspectors and recorders. Prefer `read::<SomeEvent>()` otherwise.
    pub fn take_changes(&mut self) -> Vec<StateChange> {
        mem::take(&mut self.changes)
    }

    // Crate-public

    pub(crate) fn push_changes(&mut self, changes: Vec<StateChange>) {
        if changes.is_empty() {
            return;
        }
        self.changes.extend(changes);
        self.empty = false;
    }

    pub(crate) fn push_received(&mut self, kind: StateKind, keys: Vec<StateKey>) {
        self.received.push((kind, keys));
        self.empty = false;
    }

    pub(crate) fn push_handshake_completed(&mut self, device: DeviceId) {
        self.handshakes_completed.push(device);
        self.empty = false;
    }

    pub(crate) fn push_handshake_fault(&mut self, device: DeviceId, fault: HandshakeFault) {
        self.handshake_faults.push((device, fault));
        self.empty = false;
    }

    fn drain_changes(&mut self, kind: StateKind, origin: ChangeOrigin) -> Vec<StateKey> {
        let mut keys = Vec::new();
        self.changes.retain(|change| {
            if change.kind == kind && change.origin == origin {
                keys.push(change.key);
                false
            } else {
                true
            }
        });
        keys
    }

    fn has_change(&self, kind: StateKind, origin: ChangeOrigin) -> bool {
        self.changes
            .iter()
            .any(|change| change.kind == kind && change.origin == origin)
    }
}

// Event Trait
pub trait StateEvent {
    type Iter;

    fn iter(events: &mut StateEvents) -> Self::Iter;

    fn has(events: &StateEvents) -> bool;
}

// ExternalChangeEvent
/// Keys of `R` edited locally through `set_state`
pub struct ExternalChangeEvent<R: StateRecord> {
    phantom_r: PhantomData<R>,
}
impl<R: StateRecord> StateEvent for ExternalChangeEvent<R> {
    type Iter = IntoIter<StateKey>;

    fn iter(events: &mut StateEvents) -> Self::Iter {
        IntoIterator::into_iter(events.drain_changes(StateKind::of::<R>(), ChangeOrigin::External))
    }

    fn has(events: &StateEvents) -> bool {
        events.has_change(StateKind::of::<R>(), ChangeOrigin::External)
    }
}

// InternalChangeEvent
/// Keys of `R` changed by flushed or merged values
pub struct InternalChangeEvent<R: StateRecord> {
    phantom_r: PhantomData<R>,
}
impl<R: StateRecord> StateEvent for InternalChangeEvent<R> {
    type Iter = IntoIter<StateKey>;

    fn iter(events: &mut StateEvents) -> Self::Iter {
        IntoIterator::into_iter(events.drain_changes(StateKind::of::<R>(), ChangeOrigin::Internal))
    }

    fn has(events: &StateEvents) -> bool {
        events.has_change(StateKind::of::<R>(), ChangeOrigin::Internal)
    }
}

// ReceiveStatesEvent
/// One entry per payload of `R` received from another device, holding
/// every key it carried
pub struct ReceiveStatesEvent<R: StateRecord> {
    phantom_r: PhantomData<R>,
}
impl<R: StateRecord> StateEvent for ReceiveStatesEvent<R> {
    type Iter = IntoIter<Vec<StateKey>>;

    fn iter(events: &mut StateEvents) -> Self::Iter {
        let kind = StateKind::of::<R>();
        let (matching, rest): (Vec<_>, Vec<_>) = mem::take(&mut events.received)
            .into_iter()
            .partition(|(received_kind, _)| *received_kind == kind);
        events.received = rest;
        let batches: Vec<Vec<StateKey>> = matching.into_iter().map(|(_, keys)| keys).collect();
        IntoIterator::into_iter(batches)
    }

    fn has(events: &StateEvents) -> bool {
        let kind = StateKind::of::<R>();
        events
            .received
            .iter()
            .any(|(received_kind, _)| *received_kind == kind)
    }
}

// HandshakeCompleteEvent
pub struct HandshakeCompleteEvent;
impl StateEvent for HandshakeCompleteEvent {
    type Iter = IntoIter<DeviceId>;

    fn iter(events: &mut StateEvents) -> Self::Iter {
        let list = mem::take(&mut events.handshakes_completed);
        IntoIterator::into_iter(list)
    }

    fn has(events: &StateEvents) -> bool {
        !events.handshakes_completed.is_empty()
    }
}

// HandshakeFaultEvent
pub struct HandshakeFaultEvent;
impl StateEvent for HandshakeFaultEvent {
    type Iter = IntoIter<(DeviceId, HandshakeFault)>;

    fn iter(events: &mut StateEvents) -> Self::Iter {
        let list = mem::take(&mut events.handshake_faults);
        IntoIterator::into_iter(list)
    }

    fn has(events: &StateEvents) -> bool {
        !events.handshake_faults.is_empty()
    }
}
