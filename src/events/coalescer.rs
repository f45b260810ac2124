//! Keyed event queue with a throttled flush.
//!
//! Events are stored per key; queuing an event under a key that is already
//! pending replaces it in place. Emission goes through one throttle shared by
//! every caller: the first emit in a quiet period is delivered at once, later
//! emits inside the window are merged into a single trailing delivery that
//! the host triggers by calling [`EventCoalescer::poll`].
//!
//! Held keys (an uncommitted draft row) stay queued through `emit` and
//! `flush` until released, emitted individually or removed.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;
use std::time::Duration;

use rustc_hash::FxHashMap;
use web_time::Instant;

use super::Clock;

pub type Listener<K, E> = Box<dyn FnMut(&[(K, E)])>;

/// Which keys a scheduled emit covers.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope<K> {
    All,
    Keys(Vec<K>),
}

impl<K: PartialEq + Clone> Scope<K> {
    fn merge(&mut self, keys: Option<&[K]>) {
        let Some(keys) = keys else {
            *self = Scope::All;
            return;
        };
        if let Scope::Keys(existing) = self {
            for key in keys {
                if !existing.contains(key) {
                    existing.push(key.clone());
                }
            }
        }
    }

    fn from_keys(keys: Option<&[K]>) -> Self {
        match keys {
            None => Scope::All,
            Some(keys) => Scope::Keys(keys.to_vec()),
        }
    }
}

pub struct EventCoalescer<K, E> {
    /// Pending events in first-queued order.
    pending: BTreeMap<u64, (K, E)>,
    /// Sequence number of each pending key.
    index: FxHashMap<K, u64>,
    next_seq: u64,
    held: HashSet<K>,
    clock: Box<dyn Clock>,
    throttle: Duration,
    auto_emit: bool,
    last_emit: Option<Instant>,
    scheduled: Option<(Instant, Scope<K>)>,
    listener: Option<Listener<K, E>>,
}

impl<K, E> EventCoalescer<K, E>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    pub fn new(clock: Box<dyn Clock>, throttle: Duration, auto_emit: bool) -> Self {
        Self {
            pending: BTreeMap::new(),
            index: FxHashMap::default(),
            next_seq: 0,
            held: HashSet::new(),
            clock,
            throttle,
            auto_emit,
            last_emit: None,
            scheduled: None,
            listener: None,
        }
    }

    /// Receive every delivered batch.
    pub fn set_listener(&mut self, listener: impl FnMut(&[(K, E)]) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn set_auto_emit(&mut self, auto_emit: bool) {
        self.auto_emit = auto_emit;
    }

    /// Queue `event` under `key`, replacing a pending one in place.
    ///
    /// With auto-emit on, also requests a throttled emit of everything and
    /// returns whatever that delivered right away.
    pub fn add_event(&mut self, key: K, event: E) -> Vec<(K, E)> {
        match self.index.get(&key).copied() {
            Some(seq) => {
                if let Some(slot) = self.pending.get_mut(&seq) {
                    slot.1 = event;
                }
            }
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.index.insert(key.clone(), seq);
                self.pending.insert(seq, (key, event));
            }
        }
        if self.auto_emit {
            self.emit(None)
        } else {
            Vec::new()
        }
    }

    /// Emit the listed keys (all when `None`) through the throttle.
    ///
    /// Returns the batch when it was delivered immediately; otherwise the
    /// keys are merged into the pending trailing emit.
    pub fn emit(&mut self, keys: Option<&[K]>) -> Vec<(K, E)> {
        let now = self.clock.now();
        let open = self
            .last_emit
            .is_none_or(|last| now.duration_since(last) >= self.throttle);

        if open && self.scheduled.is_none() {
            return self.deliver(&Scope::from_keys(keys), now);
        }

        match self.scheduled.as_mut() {
            Some((_, scope)) => scope.merge(keys),
            None => {
                let deadline = self.last_emit.map_or(now, |last| last + self.throttle);
                self.scheduled = Some((deadline, Scope::from_keys(keys)));
            }
        }
        tracing::trace!(target: "xlgrid::events", pending = self.pending.len(), "emit throttled");
        Vec::new()
    }

    /// Deliver a trailing emit whose window has elapsed.
    pub fn poll(&mut self) -> Vec<(K, E)> {
        let now = self.clock.now();
        match &self.scheduled {
            Some((deadline, _)) if *deadline <= now => {}
            _ => return Vec::new(),
        }
        match self.scheduled.take() {
            Some((_, scope)) => self.deliver(&scope, now),
            None => Vec::new(),
        }
    }

    /// When the pending trailing emit is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduled.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Cancel the throttle and deliver every non-held event now.
    pub fn flush(&mut self) -> Vec<(K, E)> {
        self.scheduled = None;
        let now = self.clock.now();
        self.deliver(&Scope::All, now)
    }

    /// Deliver the event under `key` immediately, bypassing throttle and hold.
    pub fn emit_event(&mut self, key: &K) -> Option<(K, E)> {
        self.held.remove(key);
        let entry = self.take(key)?;
        let batch = [entry];
        if let Some(listener) = self.listener.as_mut() {
            listener(&batch);
        }
        let [entry] = batch;
        Some(entry)
    }

    /// Drop the pending event under `key` without emitting it.
    pub fn remove_event(&mut self, key: &K) -> Option<E> {
        self.held.remove(key);
        self.take(key).map(|(_, event)| event)
    }

    fn take(&mut self, key: &K) -> Option<(K, E)> {
        let seq = self.index.remove(key)?;
        self.pending.remove(&seq)
    }

    /// Keep `key` out of `emit`/`flush` deliveries.
    pub fn hold(&mut self, key: K) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: &K) {
        self.held.remove(key);
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn pending_keys(&self) -> impl Iterator<Item = &K> {
        self.pending.values().map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop everything without emitting. Later emits and flushes are no-ops.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.index.clear();
        self.held.clear();
        self.scheduled = None;
    }

    fn deliver(&mut self, scope: &Scope<K>, now: Instant) -> Vec<(K, E)> {
        let held = &self.held;
        let due: Vec<u64> = self
            .pending
            .iter()
            .filter(|(_, (k, _))| {
                !held.contains(k)
                    && match scope {
                        Scope::All => true,
                        Scope::Keys(keys) => keys.contains(k),
                    }
            })
            .map(|(seq, _)| *seq)
            .collect();
        let mut batch = Vec::with_capacity(due.len());
        for seq in due {
            if let Some((key, event)) = self.pending.remove(&seq) {
                self.index.remove(&key);
                batch.push((key, event));
            }
        }
        if batch.is_empty() {
            return batch;
        }
        self.last_emit = Some(now);
        tracing::trace!(target: "xlgrid::events", count = batch.len(), "events emitted");
        if let Some(listener) = self.listener.as_mut() {
            listener(&batch);
        }
        batch
    }
}

impl<K, E> Drop for EventCoalescer<K, E> {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            tracing::debug!(
                target: "xlgrid::events",
                dropped = self.pending.len(),
                "coalescer dropped with pending events"
            );
        }
    }
}
