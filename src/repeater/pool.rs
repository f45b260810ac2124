//! Bounded pool of detached views.
//!
//! Detached views are kept for reuse up to a fixed capacity. Anything that
//! does not fit is handed back to the caller so it can be destroyed.

/// A LIFO pool with a fixed capacity.
///
/// A capacity of 0 disables pooling entirely.
pub struct ViewPool<V> {
    views: Vec<V>,
    capacity: usize,
}

impl<V> ViewPool<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            views: Vec::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Offer a detached view. Returns it back when the pool is full.
    pub fn put(&mut self, view: V) -> Option<V> {
        if self.views.len() >= self.capacity {
            return Some(view);
        }
        self.views.push(view);
        None
    }

    /// Take the most recently detached view, if any.
    pub fn take(&mut self) -> Option<V> {
        self.views.pop()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Shrink or grow the capacity; returns views that no longer fit.
    pub fn set_capacity(&mut self, capacity: usize) -> Vec<V> {
        self.capacity = capacity;
        if self.views.len() > capacity {
            self.views.split_off(capacity)
        } else {
            Vec::new()
        }
    }

    /// Remove all pooled views.
    pub fn drain(&mut self) -> std::vec::Drain<'_, V> {
        self.views.drain(..)
    }
}
