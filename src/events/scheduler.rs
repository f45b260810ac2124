//! Deferred work: frame-coalesced recomputations, single retries and
//! focus-after-insert.

use std::time::Duration;

use web_time::Instant;

use super::Clock;
use crate::types::RowId;

pub type FrameId = u64;

/// At most one pending request per gesture key; a new request supersedes
/// the pending one. The host drains requests once per animation frame.
#[derive(Debug)]
pub struct FrameRequests<K, R> {
    next_id: FrameId,
    pending: Vec<(K, FrameId, R)>,
}

impl<K, R> Default for FrameRequests<K, R> {
    fn default() -> Self {
        Self {
            next_id: 1,
            pending: Vec::new(),
        }
    }
}

impl<K: PartialEq, R> FrameRequests<K, R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `request` for `key`, replacing any pending one.
    pub fn request(&mut self, key: K, request: R) -> FrameId {
        let id = self.next_id;
        self.next_id += 1;
        match self.pending.iter_mut().find(|(k, _, _)| *k == key) {
            Some(slot) => {
                slot.1 = id;
                slot.2 = request;
            }
            None => self.pending.push((key, id, request)),
        }
        tracing::trace!(target: "xlgrid::events", id, "frame requested");
        id
    }

    /// Cancel a request. Cancelling one that already ran or was superseded
    /// is a no-op that returns `false`.
    pub fn cancel(&mut self, id: FrameId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(_, pending, _)| *pending != id);
        self.pending.len() != before
    }

    pub fn cancel_key(&mut self, key: &K) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(k, _, _)| k != key);
        self.pending.len() != before
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.iter().any(|(k, _, _)| k == key)
    }

    /// The frame fired: take every pending request in scheduling order.
    pub fn take_frame(&mut self) -> Vec<(K, R)> {
        self.pending
            .drain(..)
            .map(|(key, _, request)| (key, request))
            .collect()
    }
}

/// Queries that failed once are retried exactly once after a fixed delay.
pub struct RetryQueue<T> {
    delay: Duration,
    clock: Box<dyn Clock>,
    waiting: Vec<(Instant, T)>,
}

impl<T> RetryQueue<T> {
    pub fn new(clock: Box<dyn Clock>, delay: Duration) -> Self {
        Self {
            delay,
            clock,
            waiting: Vec::new(),
        }
    }

    /// Run `query` now; on failure keep `item` for one retry.
    pub fn attempt<R>(&mut self, item: T, query: impl FnOnce(&T) -> Option<R>) -> Option<R> {
        let result = query(&item);
        if result.is_none() {
            let due = self.clock.now() + self.delay;
            self.waiting.push((due, item));
        }
        result
    }

    /// Retry every item whose delay elapsed. Each item gets this one last
    /// try; its outcome is returned either way.
    pub fn poll<R>(&mut self, mut query: impl FnMut(&T) -> Option<R>) -> Vec<(T, Option<R>)> {
        let now = self.clock.now();
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.waiting)
            .into_iter()
            .partition(|(at, _)| *at <= now);
        self.waiting = waiting;
        due.into_iter()
            .map(|(_, item)| {
                let result = query(&item);
                if result.is_none() {
                    tracing::debug!(target: "xlgrid::events", "retry failed");
                }
                (item, result)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    pub fn clear(&mut self) {
        self.waiting.clear();
    }
}

/// Focus a cell of a row once the host rendered it.
///
/// Holds the row identity, never its index: the index is looked up again
/// when the focus is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFocus {
    pub row_id: RowId,
    pub column_index: usize,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::events::ManualClock;

    #[test]
    fn test_new_request_supersedes_pending() {
        let mut frames = FrameRequests::new();
        let first = frames.request("drag", 1);
        let second = frames.request("drag", 2);
        frames.request("fill", 3);
        assert!(!frames.cancel(first));
        assert_eq!(frames.take_frame(), vec![("drag", 2), ("fill", 3)]);
        assert!(!frames.cancel(second));
        assert!(frames.take_frame().is_empty());
    }

    #[test]
    fn test_cancel_pending() {
        let mut frames = FrameRequests::new();
        let id = frames.request("drag", ());
        assert!(frames.cancel(id));
        assert!(!frames.is_pending(&"drag"));
    }

    #[test]
    fn test_retry_once_after_delay() {
        let clock = ManualClock::new();
        let mut retries = RetryQueue::new(Box::new(clock.clone()), Duration::from_millis(150));
        assert_eq!(retries.attempt("row-1", |_| None::<u32>), None);
        assert_eq!(retries.len(), 1);

        clock.advance_ms(100);
        assert!(retries.poll(|_| Some(1)).is_empty());

        clock.advance_ms(50);
        let out = retries.poll(|_| Some(7));
        assert_eq!(out, vec![("row-1", Some(7))]);
        assert!(retries.is_empty());
    }
}
