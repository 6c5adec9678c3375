use std::{collections::HashMap, time::Instant};

use indexmap::{set, IndexSet};
use log::warn;

use crate::{
    pipe::StatePipe,
    state::{
        ChangeOrigin, StateChange, StateConfig, StateError, StateKind, StateRecord, WriteMode,
    },
    types::{is_valid_key, StateKey, MAX_STATE_KEY},
};

/// Holds every record of one type, split into the last agreed
/// (authoritative) values and local edits not yet flushed (pending).
pub struct StateContainer<R: StateRecord> {
    kind: StateKind,
    config: StateConfig,
    write_mode: WriteMode,
    authoritative: HashMap<StateKey, R>,
    pending: HashMap<StateKey, R>,
    // insertion ordered, never shrinks
    key_index: IndexSet<StateKey>,
    changes: Vec<StateChange>,
    last_flush_attempt: Option<Instant>,
    last_sent: Option<Instant>,
    last_received: Option<Instant>,
}

enum Reconcile<R> {
    Insert,
    Overwrite,
    Unchanged,
    AdoptRemote,
    KeepMerged(R),
    DiscardMerged,
}

impl<R: StateRecord> StateContainer<R> {
    pub fn new(config: StateConfig) -> Self {
        Self {
            kind: StateKind::of::<R>(),
            config,
            write_mode: WriteMode::default(),
            authoritative: HashMap::new(),
            pending: HashMap::new(),
            key_index: IndexSet::new(),
            changes: Vec::new(),
            last_flush_attempt: None,
            last_sent: None,
            last_received: None,
        }
    }

    pub fn kind(&self) -> StateKind {
        self.kind
    }

    pub fn config(&self) -> &StateConfig {
        &self.config
    }

    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    pub fn set_write_mode(&mut self, write_mode: WriteMode) {
        self.write_mode = write_mode;
    }

    pub fn last_flush_attempt(&self) -> Option<Instant> {
        self.last_flush_attempt
    }

    pub fn last_sent(&self) -> Option<Instant> {
        self.last_sent
    }

    pub fn last_received(&self) -> Option<Instant> {
        self.last_received
    }

    // Reads

    /// Number of distinct keys across authoritative and pending states
    pub fn count(&self) -> usize {
        self.key_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_index.is_empty()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn key_exists(&self, key: StateKey) -> bool {
        self.pending.contains_key(&key) || self.authoritative.contains_key(&key)
    }

    /// Reads a record, preferring an unflushed local edit over the
    /// authoritative value
    pub fn get(&self, key: StateKey) -> Result<&R, StateError> {
        self.check_key(key)?;
        self.pending
            .get(&key)
            .or_else(|| self.authoritative.get(&key))
            .ok_or(StateError::KeyNotFound {
                kind: self.kind.name(),
                key,
            })
    }

    /// Iterates resolved values in key insertion order. Each call starts
    /// from the first key again.
    pub fn iter(&self) -> StateIter<'_, R> {
        StateIter {
            container: self,
            keys: self.key_index.iter(),
        }
    }

    pub fn states(&self) -> Vec<R> {
        self.iter().cloned().collect()
    }

    /// Returns 0 for an empty container, otherwise one past the highest
    /// key ever used. Keys are never reclaimed.
    pub fn next_available_key(&self) -> Result<StateKey, StateError> {
        let Some(max_key) = self.key_index.iter().max().copied() else {
            return Ok(0);
        };
        if max_key >= MAX_STATE_KEY - 1 {
            return Err(StateError::IndexOutOfRange {
                kind: self.kind.name(),
                key: MAX_STATE_KEY,
                max: MAX_STATE_KEY - 1,
            });
        }
        Ok(max_key + 1)
    }

    // Writes

    /// Adds a new record as a pending change. Fails without mutating
    /// anything if the key is invalid or already taken.
    pub fn add_state(&mut self, record: R) -> Result<(), StateError> {
        let key = record.key();
        self.check_key(key)?;
        if self.key_exists(key) {
            return Err(StateError::DuplicateKey {
                kind: self.kind.name(),
                key,
            });
        }
        self.pending.insert(key, record);
        self.key_index.insert(key);
        Ok(())
    }

    /// Records a local edit. Ignored with a warning while the container
    /// is not writable.
    pub fn set(&mut self, value: R) -> Result<(), StateError> {
        let key = value.key();
        self.check_key(key)?;
        if !self.write_mode.accepts_writes() {
            warn!(
                "Attempted to set {} state {} while in {:?} mode, ignoring",
                self.kind, key, self.write_mode
            );
            return Ok(());
        }
        if self.try_set_value(value) {
            Ok(())
        } else {
            Err(StateError::KeyNotFound {
                kind: self.kind.name(),
                key,
            })
        }
    }

    /// Returns false if the key is unknown. A value equal to the current
    /// one is accepted but changes nothing.
    pub fn try_set_value(&mut self, value: R) -> bool {
        let key = value.key();
        if let Some(pending) = self.pending.get(&key) {
            if pending.is_different(&value) {
                self.pending.insert(key, value);
                self.push_change(key, ChangeOrigin::External);
            }
            return true;
        }
        if let Some(current) = self.authoritative.get(&key) {
            if current.is_different(&value) {
                self.pending.insert(key, value);
                self.push_change(key, ChangeOrigin::External);
            }
            return true;
        }
        false
    }

    // Flushing

    pub fn flush(&mut self, pipe: &mut dyn StatePipe, now: Instant) {
        let keys: Vec<StateKey> = self
            .key_index
            .iter()
            .filter(|key| self.pending.contains_key(*key))
            .copied()
            .collect();
        self.flush_keys(pipe, &keys, now);
    }

    pub fn flush_key(&mut self, pipe: &mut dyn StatePipe, key: StateKey, now: Instant) {
        self.flush_keys(pipe, &[key], now);
    }

    /// Sends the pending records for `keys` that are new or differ from
    /// their authoritative value, then folds them in as authoritative.
    /// Every swept pending entry is removed, sent or not.
    pub fn flush_keys(&mut self, pipe: &mut dyn StatePipe, keys: &[StateKey], now: Instant) {
        self.last_flush_attempt = Some(now);

        let flushed = self.sweep_pending(keys);
        if flushed.is_empty() {
            return;
        }

        pipe.send_flushed_states(self.config.wire_id, self.config.delivery_mode, &flushed);
        self.last_sent = Some(now);
        self.receive_flushed_states(flushed, now);
    }

    fn sweep_pending(&mut self, keys: &[StateKey]) -> Vec<R> {
        let mut flushed = Vec::new();
        for key in keys {
            let Some(pending) = self.pending.remove(key) else {
                continue;
            };
            let changed = match self.authoritative.get(key) {
                Some(current) => current.is_different(&pending),
                None => true,
            };
            if changed {
                flushed.push(pending);
            }
        }
        flushed
    }

    // Receiving

    /// Applies records flushed by this or another device. Returns the
    /// keys whose authoritative value changed.
    pub fn receive_flushed_states<I: IntoIterator<Item = R>>(
        &mut self,
        remote_states: I,
        now: Instant,
    ) -> Vec<StateKey> {
        let mut changed = Vec::new();

        for remote in remote_states {
            let key = remote.key();
            if !is_valid_key(key) {
                warn!("Dropping received {} state with invalid key {}", self.kind, key);
                continue;
            }

            match self.reconcile(&remote) {
                Reconcile::Unchanged => continue,
                Reconcile::Insert => {
                    self.key_index.insert(key);
                    self.push_change(key, ChangeOrigin::Internal);
                }
                Reconcile::Overwrite => {
                    self.push_change(key, ChangeOrigin::Internal);
                }
                Reconcile::AdoptRemote | Reconcile::DiscardMerged => {
                    self.pending.remove(&key);
                }
                Reconcile::KeepMerged(merged) => {
                    self.pending.insert(key, merged);
                    self.push_change(key, ChangeOrigin::Internal);
                }
            }

            self.authoritative.insert(key, remote);
            changed.push(key);
        }

        if !changed.is_empty() {
            self.last_received = Some(now);
        }
        changed
    }

    fn reconcile(&self, remote: &R) -> Reconcile<R> {
        let key = remote.key();
        let Some(current) = self.authoritative.get(&key) else {
            return Reconcile::Insert;
        };
        if !remote.is_different(current) {
            return Reconcile::Unchanged;
        }
        let Some(pending) = self.pending.get(&key) else {
            return Reconcile::Overwrite;
        };
        if !pending.is_different(current) {
            return Reconcile::AdoptRemote;
        }
        let merged = R::merge(pending, remote);
        if merged.is_different(current) {
            Reconcile::KeepMerged(merged)
        } else {
            Reconcile::DiscardMerged
        }
    }

    /// Bulk loads a full snapshot as authoritative. Pending edits and
    /// change notifications are left untouched.
    pub fn receive_synchronized_states<I: IntoIterator<Item = R>>(
        &mut self,
        states: I,
    ) -> usize {
        let mut loaded = 0;
        for state in states {
            let key = state.key();
            if !is_valid_key(key) {
                warn!("Dropping synchronized {} state with invalid key {}", self.kind, key);
                continue;
            }
            self.key_index.insert(key);
            self.authoritative.insert(key, state);
            loaded += 1;
        }
        loaded
    }

    // Notifications

    pub fn take_changes(&mut self) -> Vec<StateChange> {
        std::mem::take(&mut self.changes)
    }

    fn push_change(&mut self, key: StateKey, origin: ChangeOrigin) {
        self.changes.push(StateChange {
            kind: self.kind,
            key,
            origin,
        });
    }

    fn check_key(&self, key: StateKey) -> Result<(), StateError> {
        if is_valid_key(key) {
            Ok(())
        } else {
            Err(StateError::IndexOutOfRange {
                kind: self.kind.name(),
                key,
                max: MAX_STATE_KEY - 1,
            })
        }
    }
}

pub struct StateIter<'a, R: StateRecord> {
    container: &'a StateContainer<R>,
    keys: set::Iter<'a, StateKey>,
}

impl<'a, R: StateRecord> Iterator for StateIter<'a, R> {
    type Item = &'a R;

    fn next(&mut self) -> Option<Self::Item> {
        for key in self.keys.by_ref() {
            let container = self.container;
            if let Some(value) = container
                .pending
                .get(key)
                .or_else(|| container.authoritative.get(key))
            {
                return Some(value);
            }
        }
        None
    }
}

impl<'a, R: StateRecord> IntoIterator for &'a StateContainer<R> {
    type Item = &'a R;
    type IntoIter = StateIter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
